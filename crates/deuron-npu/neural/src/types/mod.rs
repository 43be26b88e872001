// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Neural Types Module
//!
//! Identity types, the id allocator and the crate error type.

pub mod error;
pub mod id_manager;
pub mod ids;

pub use error::{NeuralError, Result};
pub use id_manager::IdAllocator;
pub use ids::{CellId, CompartmentId, ConnectionId, DendriteId, StreamId, StreamKind, SynapseId};
