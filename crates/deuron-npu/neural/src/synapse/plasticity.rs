// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Plasticity hook
//!
//! A synapse owns its `SynapticState` and hands it to a shared
//! `PlasticityRule` once per tick during the process pass. The rule sees the
//! state as it was after the previous tick (`last_pre` / `last_post` still hold
//! the earlier spike times); the synapse records the new spike times after the
//! rule returns.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cell::SomaView;

/// Weight and trace state of one synapse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynapticState {
    /// Intrinsic weight (structural, survives reset)
    pub intrinsic: f64,
    /// Transient potentiation/depression on top of `intrinsic`
    pub transient: f64,
    /// Ceiling for the effective weight
    pub weight_max: f64,
    pub pre_trace: f64,
    pub post_trace: f64,
    pub triplet_trace: f64,
    /// Tick of the most recent presynaptic arrival
    pub last_pre: Option<u64>,
    /// Tick of the most recent postsynaptic action potential seen
    pub last_post: Option<u64>,
}

impl SynapticState {
    pub fn new(intrinsic: f64, weight_max: f64) -> Self {
        Self {
            intrinsic,
            transient: 0.0,
            weight_max,
            pre_trace: 0.0,
            post_trace: 0.0,
            triplet_trace: 0.0,
            last_pre: None,
            last_post: None,
        }
    }

    /// `clamp(intrinsic + transient, 0, weight_max)`
    #[inline]
    pub fn effective_weight(&self) -> f64 {
        (self.intrinsic + self.transient).clamp(0.0, self.weight_max)
    }

    /// Add `delta` to the transient part, keeping the effective weight in range
    pub fn apply_weight_change(&mut self, delta: f64) {
        let total = (self.intrinsic + self.transient + delta).clamp(0.0, self.weight_max);
        self.transient = total - self.intrinsic;
    }

    /// Clear per-trial state; the intrinsic weight is kept
    pub fn reset(&mut self) {
        self.transient = 0.0;
        self.pre_trace = 0.0;
        self.post_trace = 0.0;
        self.triplet_trace = 0.0;
        self.last_pre = None;
        self.last_post = None;
    }
}

/// Spike timing seen by one synapse during one process pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpikeTiming {
    pub tick: u64,
    /// A presynaptic spike is on the connection this tick
    pub pre_spike: bool,
    /// Tick of a postsynaptic action potential not yet seen by this synapse
    pub post_spike: Option<u64>,
    /// Soma state of the owning cell
    pub soma: SomaView,
}

/// Learning rule applied to a synapse once per tick, before integration
pub trait PlasticityRule: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn process(&self, state: &mut SynapticState, timing: &SpikeTiming);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_weight_clamped() {
        let mut state = SynapticState::new(1.0, 2.0);
        state.transient = 5.0;
        assert_eq!(state.effective_weight(), 2.0);
        state.transient = -3.0;
        assert_eq!(state.effective_weight(), 0.0);
    }

    #[test]
    fn test_apply_weight_change_stays_in_range() {
        let mut state = SynapticState::new(1.0, 1.5);
        state.apply_weight_change(10.0);
        assert_eq!(state.effective_weight(), 1.5);
        assert_eq!(state.transient, 0.5);
        state.apply_weight_change(-10.0);
        assert_eq!(state.effective_weight(), 0.0);
    }

    #[test]
    fn test_reset_keeps_intrinsic() {
        let mut state = SynapticState::new(0.7, 1.0);
        state.apply_weight_change(0.2);
        state.pre_trace = 1.0;
        state.last_pre = Some(3);
        state.reset();
        assert_eq!(state, SynapticState::new(0.7, 1.0));
    }
}
