// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Plasticity rules plugged into `ProtoSynapse`

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use deuron_npu_neural::{PlasticityRule, SpikeTiming, SynapticState};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::stdp::{compute_pair_weight_change, StdpConfig};
use crate::PlasticityError;

/// Spike-trace time constants (ticks)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceParameters {
    /// Presynaptic trace decay (potentiation window)
    pub tau_p: f64,
    /// Postsynaptic trace decay (depression window)
    pub tau_n: f64,
    /// Triplet trace decay
    pub tau_y: f64,
}

impl Default for TraceParameters {
    fn default() -> Self {
        Self {
            tau_p: 20.0,
            tau_n: 20.0,
            tau_y: 40.0,
        }
    }
}

impl TraceParameters {
    /// One tick of exponential decay, then bump the traces that spiked
    fn advance(&self, state: &mut SynapticState, timing: &SpikeTiming) {
        state.pre_trace *= decay_factor(self.tau_p);
        state.post_trace *= decay_factor(self.tau_n);
        state.triplet_trace *= decay_factor(self.tau_y);

        if timing.pre_spike {
            state.pre_trace += 1.0;
        }
        if timing.post_spike.is_some() {
            state.post_trace += 1.0;
            state.triplet_trace += 1.0;
        }
    }
}

#[inline]
fn decay_factor(tau: f64) -> f64 {
    (-1.0 / tau.max(1e-6)).exp()
}

/// Traces only. Weights stay at their intrinsic value.
#[derive(Debug, Clone, Default)]
pub struct TraceRule {
    pub traces: TraceParameters,
}

impl TraceRule {
    pub fn new(traces: TraceParameters) -> Self {
        Self { traces }
    }
}

impl PlasticityRule for TraceRule {
    fn name(&self) -> &'static str {
        "trace"
    }

    fn process(&self, state: &mut SynapticState, timing: &SpikeTiming) {
        self.traces.advance(state, timing);
    }
}

/// Nearest-neighbour pair STDP on the transient weight
///
/// The transient part relaxes toward zero with `tau_y` each tick, so a
/// synapse that stops pairing drifts back to its intrinsic weight.
#[derive(Debug, Clone, Default)]
pub struct PairStdpRule {
    pub traces: TraceParameters,
    pub stdp: StdpConfig,
}

impl PairStdpRule {
    pub fn new(traces: TraceParameters, stdp: StdpConfig) -> Self {
        Self { traces, stdp }
    }
}

impl PlasticityRule for PairStdpRule {
    fn name(&self) -> &'static str {
        "pair"
    }

    fn process(&self, state: &mut SynapticState, timing: &SpikeTiming) {
        self.traces.advance(state, timing);
        state.transient *= decay_factor(self.traces.tau_y);

        // New post spike pairs with the latest earlier pre spike
        if let (Some(post), Some(pre)) = (timing.post_spike, state.last_pre) {
            let dt = post as i64 - pre as i64;
            state.apply_weight_change(compute_pair_weight_change(dt, &self.stdp));
        }

        // Arriving pre spike pairs with the latest post spike
        if timing.pre_spike {
            if let Some(post) = timing.post_spike.or(state.last_post) {
                let dt = post as i64 - timing.tick as i64;
                if dt < 0 {
                    state.apply_weight_change(compute_pair_weight_change(dt, &self.stdp));
                }
            }
        }
    }
}

/// Rule names accepted by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlasticityRuleKind {
    #[default]
    Trace,
    Pair,
}

impl PlasticityRuleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PlasticityRuleKind::Trace => "trace",
            PlasticityRuleKind::Pair => "pair",
        }
    }
}

impl fmt::Display for PlasticityRuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlasticityRuleKind {
    type Err = PlasticityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(PlasticityRuleKind::Trace),
            "pair" => Ok(PlasticityRuleKind::Pair),
            other => Err(PlasticityError::UnknownRule(other.to_string())),
        }
    }
}

/// Build the shared rule instance handed to every synapse
pub fn create_rule(
    kind: PlasticityRuleKind,
    traces: TraceParameters,
    stdp: StdpConfig,
) -> Arc<dyn PlasticityRule> {
    debug!("[PLASTICITY] Using '{}' rule: {:?} {:?}", kind, traces, stdp);
    match kind {
        PlasticityRuleKind::Trace => Arc::new(TraceRule::new(traces)),
        PlasticityRuleKind::Pair => Arc::new(PairStdpRule::new(traces, stdp)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deuron_npu_neural::SomaView;

    fn timing(tick: u64, pre_spike: bool, post_spike: Option<u64>) -> SpikeTiming {
        SpikeTiming {
            tick,
            pre_spike,
            post_spike,
            soma: SomaView::default(),
        }
    }

    /// Mimics what `ProtoSynapse::process` records after the rule runs
    fn record(state: &mut SynapticState, t: &SpikeTiming) {
        if t.pre_spike {
            state.last_pre = Some(t.tick);
        }
        if t.post_spike.is_some() {
            state.last_post = t.post_spike;
        }
    }

    #[test]
    fn test_trace_rule_never_changes_weight() {
        let rule = TraceRule::default();
        let mut state = SynapticState::new(0.8, 2.0);
        for tick in 0..50 {
            let t = timing(tick, tick % 3 == 0, (tick % 7 == 0).then_some(tick));
            rule.process(&mut state, &t);
            record(&mut state, &t);
        }
        assert_eq!(state.transient, 0.0);
        assert_eq!(state.effective_weight(), 0.8);
        assert!(state.pre_trace > 0.0);
    }

    #[test]
    fn test_traces_decay() {
        let rule = TraceRule::default();
        let mut state = SynapticState::new(1.0, 2.0);
        rule.process(&mut state, &timing(0, true, None));
        assert_eq!(state.pre_trace, 1.0);
        rule.process(&mut state, &timing(1, false, None));
        assert!((state.pre_trace - (-1.0f64 / 20.0).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_pair_rule_potentiates_pre_then_post() {
        let rule = PairStdpRule::default();
        let mut state = SynapticState::new(1.0, 2.0);

        let pre = timing(10, true, None);
        rule.process(&mut state, &pre);
        record(&mut state, &pre);

        let post = timing(15, false, Some(14));
        rule.process(&mut state, &post);

        assert!(state.transient > 0.0);
        assert!(state.effective_weight() > 1.0);
    }

    #[test]
    fn test_pair_rule_depresses_post_then_pre() {
        let rule = PairStdpRule::default();
        let mut state = SynapticState::new(1.0, 2.0);

        let post = timing(5, false, Some(4));
        rule.process(&mut state, &post);
        record(&mut state, &post);

        rule.process(&mut state, &timing(9, true, None));
        assert!(state.transient < 0.0);
        assert!(state.effective_weight() < 1.0);
    }

    #[test]
    fn test_pair_transient_relaxes_without_pairing() {
        let rule = PairStdpRule::default();
        let mut state = SynapticState::new(1.0, 2.0);
        state.transient = 0.4;

        rule.process(&mut state, &timing(0, false, None));
        assert!((state.transient - 0.4 * (-1.0f64 / 40.0).exp()).abs() < 1e-12);

        for tick in 1..400 {
            rule.process(&mut state, &timing(tick, false, None));
        }
        assert!(state.transient < 1e-3);
        assert!((state.effective_weight() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_pair_rule_respects_ceiling() {
        let rule = PairStdpRule::new(
            TraceParameters::default(),
            StdpConfig {
                a_plus: 5.0,
                ..Default::default()
            },
        );
        let mut state = SynapticState::new(1.0, 1.5);
        let pre = timing(0, true, None);
        rule.process(&mut state, &pre);
        record(&mut state, &pre);
        rule.process(&mut state, &timing(2, false, Some(1)));
        assert_eq!(state.effective_weight(), 1.5);
    }

    #[test]
    fn test_rule_kind_parsing() {
        assert_eq!("trace".parse::<PlasticityRuleKind>(), Ok(PlasticityRuleKind::Trace));
        assert_eq!(" Pair ".parse::<PlasticityRuleKind>(), Ok(PlasticityRuleKind::Pair));
        assert!("hebb".parse::<PlasticityRuleKind>().is_err());
        assert_eq!(PlasticityRuleKind::default(), PlasticityRuleKind::Trace);
    }

    #[test]
    fn test_create_rule() {
        let rule = create_rule(
            PlasticityRuleKind::Pair,
            TraceParameters::default(),
            StdpConfig::default(),
        );
        assert_eq!(rule.name(), "pair");
    }
}
