// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Prototype synapse

use std::sync::Arc;

use super::contribution::{compute_synaptic_contribution, SynapseType};
use super::plasticity::{PlasticityRule, SpikeTiming, SynapticState};
use super::Synapse;
use crate::cell::ProcessContext;
use crate::connection::ConnectionPool;
use crate::types::{CompartmentId, ConnectionId, SynapseId};

pub struct ProtoSynapse {
    id: SynapseId,
    compartment: CompartmentId,
    synapse_type: SynapseType,
    connection: ConnectionId,
    state: SynapticState,
    rule: Arc<dyn PlasticityRule>,
}

impl ProtoSynapse {
    pub fn new(
        id: SynapseId,
        compartment: CompartmentId,
        synapse_type: SynapseType,
        connection: ConnectionId,
        state: SynapticState,
        rule: Arc<dyn PlasticityRule>,
    ) -> Self {
        Self {
            id,
            compartment,
            synapse_type,
            connection,
            state,
            rule,
        }
    }

    pub fn rule(&self) -> &Arc<dyn PlasticityRule> {
        &self.rule
    }
}

impl Synapse for ProtoSynapse {
    fn id(&self) -> SynapseId {
        self.id
    }

    fn compartment(&self) -> CompartmentId {
        self.compartment
    }

    fn synapse_type(&self) -> SynapseType {
        self.synapse_type
    }

    fn connection(&self) -> ConnectionId {
        self.connection
    }

    fn process(&mut self, ctx: &ProcessContext<'_>) {
        let pre_spike = self.input(ctx.connections) != 0;
        let post_spike = ctx.soma.ap_t.filter(|&t| Some(t) != self.state.last_post);

        let timing = SpikeTiming {
            tick: ctx.tick,
            pre_spike,
            post_spike,
            soma: ctx.soma,
        };
        self.rule.process(&mut self.state, &timing);

        if pre_spike {
            self.state.last_pre = Some(ctx.tick);
        }
        if post_spike.is_some() {
            self.state.last_post = post_spike;
        }
    }

    fn integrate(&mut self, _t: f64, connections: &ConnectionPool) -> f64 {
        compute_synaptic_contribution(
            self.input(connections),
            self.state.effective_weight(),
            self.synapse_type,
        )
    }

    fn state(&self) -> &SynapticState {
        &self.state
    }

    fn reset(&mut self) {
        self.state.reset();
    }
}

impl std::fmt::Debug for ProtoSynapse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtoSynapse")
            .field("id", &self.id)
            .field("synapse_type", &self.synapse_type)
            .field("connection", &self.connection)
            .field("weight", &self.state.effective_weight())
            .field("rule", &self.rule.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::SomaView;
    use std::sync::Mutex;

    /// Test-only rule that remembers what it was shown
    #[derive(Debug, Default)]
    struct Recorder {
        seen: Mutex<Vec<SpikeTiming>>,
    }

    impl PlasticityRule for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn process(&self, _state: &mut SynapticState, timing: &SpikeTiming) {
            self.seen.lock().unwrap().push(*timing);
        }
    }

    fn synapse(
        pool: &mut ConnectionPool,
        rule: Arc<dyn PlasticityRule>,
        ty: SynapseType,
    ) -> ProtoSynapse {
        let conn = pool.add_straight();
        ProtoSynapse::new(
            SynapseId(0),
            CompartmentId(0),
            ty,
            conn,
            SynapticState::new(0.5, 1.0),
            rule,
        )
    }

    #[test]
    fn test_integrate_follows_connection() {
        let mut pool = ConnectionPool::new();
        let rule = Arc::new(Recorder::default());
        let mut syn = synapse(&mut pool, rule, SynapseType::Excitatory);
        assert_eq!(syn.integrate(0.0, &pool), 0.0);
        pool.input(syn.connection(), 1);
        assert_eq!(syn.integrate(0.0, &pool), 0.5);
    }

    #[test]
    fn test_inhibitory_sign() {
        let mut pool = ConnectionPool::new();
        let rule = Arc::new(Recorder::default());
        let mut syn = synapse(&mut pool, rule, SynapseType::Inhibitory);
        pool.input(syn.connection(), 1);
        assert_eq!(syn.integrate(0.0, &pool), -0.5);
    }

    #[test]
    fn test_post_spike_reported_once() {
        let mut pool = ConnectionPool::new();
        let rule = Arc::new(Recorder::default());
        let mut syn = synapse(&mut pool, rule.clone(), SynapseType::Excitatory);
        let soma = SomaView {
            ap_t: Some(4),
            prev_ap_t: None,
            ap_value: 1.0,
        };
        for tick in 5..7 {
            let ctx = ProcessContext {
                tick,
                connections: &pool,
                soma,
            };
            syn.process(&ctx);
        }
        let seen = rule.seen.lock().unwrap();
        assert_eq!(seen[0].post_spike, Some(4));
        assert_eq!(seen[1].post_spike, None);
        assert_eq!(syn.state().last_post, Some(4));
    }

    #[test]
    fn test_pre_spike_recorded() {
        let mut pool = ConnectionPool::new();
        let rule = Arc::new(Recorder::default());
        let mut syn = synapse(&mut pool, rule.clone(), SynapseType::Excitatory);
        pool.input(syn.connection(), 1);
        let ctx = ProcessContext {
            tick: 9,
            connections: &pool,
            soma: SomaView::default(),
        };
        syn.process(&ctx);
        assert!(rule.seen.lock().unwrap()[0].pre_spike);
        assert_eq!(syn.state().last_pre, Some(9));
    }
}
