// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Synaptic contribution calculation
//!
//! Pure functions for computing the drive a synapse adds to its cell.

use serde::{Deserialize, Serialize};

/// Synapse type (excitatory or inhibitory), fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SynapseType {
    Excitatory = 0,
    Inhibitory = 1,
}

impl SynapseType {
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            SynapseType::Excitatory => 1.0,
            SynapseType::Inhibitory => -1.0,
        }
    }

    pub fn is_excitatory(self) -> bool {
        self == SynapseType::Excitatory
    }
}

/// Calculate synaptic contribution
///
/// `contribution = input × weight × sign`
///
/// - `input`: connection output this tick (0 or 1)
/// - `weight`: effective weight, already clamped to `[0, weight_max]`
/// - `sign`: +1.0 for excitatory, -1.0 for inhibitory
///
/// A negative weight is treated as 0 so an inhibitory synapse can never push
/// the drive upwards.
///
/// # Example
/// ```
/// use deuron_npu_neural::synapse::{compute_synaptic_contribution, SynapseType};
///
/// assert_eq!(compute_synaptic_contribution(1, 0.5, SynapseType::Excitatory), 0.5);
/// assert_eq!(compute_synaptic_contribution(1, 0.5, SynapseType::Inhibitory), -0.5);
/// assert_eq!(compute_synaptic_contribution(0, 0.5, SynapseType::Excitatory), 0.0);
/// ```
#[inline]
pub fn compute_synaptic_contribution(input: u8, weight: f64, synapse_type: SynapseType) -> f64 {
    f64::from(input) * weight.max(0.0) * synapse_type.sign()
}
