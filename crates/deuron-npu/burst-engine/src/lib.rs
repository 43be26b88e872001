// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

// Manual `n % divisor == 0` used instead of `n.is_multiple_of(divisor)` for stable Rust
// compatibility.
#![allow(clippy::manual_is_multiple_of)]

//! # Deuron Burst Engine
//!
//! Assembles one neuron with its stimulus generators and drives it tick by tick.
//!
//! ## Layers
//! - [`Simulation`]: graph wiring from [`deuron_config::DeuronConfig`], the
//!   per-tick phase order, reset/replay, property changes
//! - [`SampleSet`]: per-tick sample recording behind the [`SampleSink`] trait
//! - [`RunResetRunner`]: background run loop, manual step/pause modes and the
//!   text command protocol

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod command;
pub mod error;
pub mod property;
pub mod property_queue;
pub mod run_reset;
pub mod samples;
pub mod simulation;
pub mod state;

pub use command::{Command, CommandError, Direction, PropertyCommand};
pub use error::{RunnerError, RunnerResult, SimulationError, SimulationResult};
pub use property::Property;
pub use property_queue::PropertyUpdateQueue;
pub use run_reset::{
    progress_message, RunResetRunner, REPLY_LOADED, REPLY_PONG, REPLY_STOPPED, STATUS_BACKLOG,
};
pub use samples::{NullSink, SampleKey, SampleLane, SampleSet, SampleSink, Spike};
pub use simulation::Simulation;
pub use state::RunnerState;
