// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Deuron Plasticity
//!
//! Concrete implementations of the `PlasticityRule` hook defined in
//! `deuron-npu-neural`:
//!
//! - [`TraceRule`]: keeps pre/post/triplet spike traces, never touches weights
//! - [`PairStdpRule`]: exponential pair STDP applied to the transient weight
//!
//! Select one by name with [`PlasticityRuleKind`] and build it with
//! [`create_rule`].

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod rules;
pub mod stdp;

pub use rules::{create_rule, PairStdpRule, PlasticityRuleKind, TraceParameters, TraceRule};
pub use stdp::{compute_pair_weight_change, StdpConfig};

/// Plasticity errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlasticityError {
    #[error("Unknown plasticity rule '{0}' (expected 'trace' or 'pair')")]
    UnknownRule(String),
}
