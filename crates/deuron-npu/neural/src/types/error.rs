// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for neural graph operations

use super::ids::{CellId, ConnectionId};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NeuralError {
    #[error("Connection not found: {0}")]
    ConnectionNotFound(ConnectionId),

    #[error("{0} has no dendrite attached")]
    DendriteMissing(CellId),

    #[error("Invalid soma parameter {field}: {reason}")]
    InvalidSomaParameter { field: &'static str, reason: String },
}

pub type Result<T> = core::result::Result<T, NeuralError>;
