// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Pure pair-STDP computation

use serde::{Deserialize, Serialize};

/// STDP configuration parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StdpConfig {
    /// Potentiation time constant (τ+)
    pub tau_plus: f64,
    /// Depression time constant (τ-)
    pub tau_minus: f64,
    /// Potentiation learning rate (A+)
    pub a_plus: f64,
    /// Depression learning rate (A-)
    pub a_minus: f64,
}

impl Default for StdpConfig {
    fn default() -> Self {
        Self {
            tau_plus: 20.0,
            tau_minus: 20.0,
            a_plus: 0.01,
            a_minus: 0.012,
        }
    }
}

/// Compute the STDP weight change for one pre/post spike pair
///
/// Uses the exponential rule:
/// - Δw = A+ · exp(-Δt/τ+) if pre before post (potentiation)
/// - Δw = -A- · exp(Δt/τ-) if post before pre (depression)
///
/// # Arguments
/// * `dt` - `post_tick - pre_tick`
///
/// # Example
/// ```
/// use deuron_npu_plasticity::stdp::{compute_pair_weight_change, StdpConfig};
///
/// let config = StdpConfig::default();
/// assert!(compute_pair_weight_change(5, &config) > 0.0);
/// assert!(compute_pair_weight_change(-5, &config) < 0.0);
/// ```
#[inline]
pub fn compute_pair_weight_change(dt: i64, config: &StdpConfig) -> f64 {
    if dt > 0 {
        let dt_f = dt as f64;
        config.a_plus * (-dt_f / config.tau_plus.max(1e-6)).exp()
    } else if dt < 0 {
        let dt_f = (-dt) as f64;
        -config.a_minus * (-dt_f / config.tau_minus.max(1e-6)).exp()
    } else {
        // Same tick counts as causal
        config.a_plus
    }
}
