// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Deuron Stimulus Generators
//!
//! Binary spike sources that write into connections once per tick:
//!
//! - [`PoissonStream`]: renewal process with seeded inter-spike intervals
//! - [`SpikeStream`]: fixed template played back from the last position
//! - [`PatternSequencer`]: a group of spike streams presented together after a
//!   randomized silent countdown
//!
//! All randomness comes from `ChaCha20Rng` seeded per generator, so `reset`
//! replays an identical sequence on every platform.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod generator;
pub mod poisson;
pub mod sequencer;
pub mod spike;

pub use generator::{derive_seeds, generate_interval, IntervalDistribution, PatternStream};
pub use poisson::PoissonStream;
pub use sequencer::{CompletionPolicy, PatternSequencer};
pub use spike::{parse_template, SpikeStream};

/// Stimulus errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StimulusError {
    #[error("Template position {position} out of range (template length {len})")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("Invalid template character '{0}' (expected '0' or '1')")]
    InvalidTemplate(char),

    #[error("Unknown completion policy '{0}' (expected 'any' or 'all')")]
    UnknownPolicy(String),
}

pub type Result<T> = std::result::Result<T, StimulusError>;
