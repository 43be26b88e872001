// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Deuron Neural Graph
//!
//! Everything a single simulated neuron is made of:
//! - **Types**: typed ids, the per-simulation id allocator, error types
//! - **Connection**: single-slot spike buffers (straight or delayed) and their pool
//! - **Synapse**: polarity, weight state and the plasticity hook
//! - **Compartment / Dendrite**: ordered aggregators of synapses
//! - **Cell**: soma threshold logic and action-potential bookkeeping
//!
//! ## Per-tick protocol
//!
//! ```text
//! stimulus step  -> Connection::input
//! Cell::process  -> Dendrite -> Compartment -> Synapse (plasticity, top-down)
//! Cell::integrate -> sum of Synapse contributions (bottom-up) -> threshold
//! ConnectionPool::post_all -> Connection::update + Connection::post
//! ```
//!
//! Every role is a trait with one prototype implementation, so other neuron
//! models can slot in behind `Box<dyn Cell>` without touching the graph.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod types;

pub mod connection;
pub mod synapse;
pub mod compartment;
pub mod dendrite;
pub mod cell;

pub use types::{
    CellId, CompartmentId, ConnectionId, DendriteId, IdAllocator, NeuralError, Result,
    StreamId, StreamKind, SynapseId,
};

pub use connection::{
    Connection, ConnectionPool, DelayedConnection, Producer, StraightConnection,
};

pub use synapse::{
    compute_synaptic_contribution, PlasticityRule, ProtoSynapse, SpikeTiming, Synapse,
    SynapseType, SynapticState,
};

pub use compartment::{Compartment, ProtoCompartment};
pub use dendrite::{Dendrite, ProtoDendrite};
pub use cell::{Cell, ProcessContext, ProtoNeuron, SomaParameters, SomaView};
