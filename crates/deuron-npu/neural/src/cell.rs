// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Cells
//!
//! A cell owns one dendrite and a soma. Each tick:
//!
//! ```text
//! process(tick)   -> dendrite.process (synapses see the soma's AP history)
//! integrate(t)    -> drive = dendrite.integrate(t)
//!                    drive > threshold ? output = 1, ap_t = tick : output = 0
//! ```
//!
//! After firing, the action potential seen by the plasticity hook decays as
//! `max_ap · exp(-(tick - ap_t) / ap_decay)`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::connection::ConnectionPool;
use crate::dendrite::Dendrite;
use crate::types::{CellId, ConnectionId, NeuralError, Result};

/// Soma parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SomaParameters {
    /// Drive must exceed this to fire
    pub threshold: f64,
    /// Decay constant (ticks) of the back-propagating action potential
    pub ap_decay: f64,
    /// Peak action-potential value
    pub max_ap: f64,
}

impl Default for SomaParameters {
    fn default() -> Self {
        Self {
            threshold: 2.0,
            ap_decay: 10.0,
            max_ap: 1.0,
        }
    }
}

impl SomaParameters {
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() {
            return Err(NeuralError::InvalidSomaParameter {
                field: "threshold",
                reason: "must be finite".to_string(),
            });
        }
        if self.ap_decay.is_nan() || self.ap_decay <= 0.0 {
            return Err(NeuralError::InvalidSomaParameter {
                field: "ap_decay",
                reason: format!("must be positive, got {}", self.ap_decay),
            });
        }
        if self.max_ap.is_nan() || self.max_ap < 0.0 {
            return Err(NeuralError::InvalidSomaParameter {
                field: "max_ap",
                reason: format!("must not be negative, got {}", self.max_ap),
            });
        }
        Ok(())
    }
}

/// Read-only snapshot of a soma handed down the graph during `process`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SomaView {
    /// Tick of the most recent action potential
    pub ap_t: Option<u64>,
    /// Tick of the action potential before that
    pub prev_ap_t: Option<u64>,
    /// Decayed action-potential value at the current tick
    pub ap_value: f64,
}

/// Everything a synapse may look at during the process pass
#[derive(Debug, Clone, Copy)]
pub struct ProcessContext<'a> {
    pub tick: u64,
    pub connections: &'a ConnectionPool,
    pub soma: SomaView,
}

/// Cell role
pub trait Cell: Send {
    fn id(&self) -> CellId;

    /// Most recent binary output; stable between ticks
    fn output(&self) -> u8;

    fn attach_dendrite(&mut self, dendrite: Box<dyn Dendrite>);

    fn dendrite(&self) -> Result<&dyn Dendrite>;

    fn add_in_connection(&mut self, connection: ConnectionId);

    fn add_out_connection(&mut self, connection: ConnectionId);

    fn out_connections(&self) -> &[ConnectionId];

    fn soma_parameters(&self) -> SomaParameters;

    fn set_soma_parameters(&mut self, params: SomaParameters) -> Result<()>;

    fn soma_view(&self, tick: u64) -> SomaView;

    /// First pass: delegate to the dendrite
    fn process(&mut self, tick: u64, connections: &ConnectionPool);

    /// Second pass: total drive for time `t`, then the threshold check
    fn integrate(&mut self, t: f64, connections: &ConnectionPool) -> f64;

    /// Write the current output into every outbound connection
    fn emit(&self, connections: &mut ConnectionPool);

    /// Clear action-potential history and per-trial state; wiring is kept
    fn reset(&mut self);
}

/// Prototype neuron: single dendrite, hard threshold
pub struct ProtoNeuron {
    id: CellId,
    output: u8,
    params: SomaParameters,
    ap_t: Option<u64>,
    prev_ap_t: Option<u64>,
    inputs: Vec<ConnectionId>,
    outputs: Vec<ConnectionId>,
    dendrite: Option<Box<dyn Dendrite>>,
}

impl ProtoNeuron {
    pub fn new(id: CellId, params: SomaParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            id,
            output: 0,
            params,
            ap_t: None,
            prev_ap_t: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            dendrite: None,
        })
    }

    pub fn in_connections(&self) -> &[ConnectionId] {
        &self.inputs
    }

    pub fn ap_value(&self, tick: u64) -> f64 {
        match self.ap_t {
            Some(ap_t) if tick >= ap_t => {
                let elapsed = (tick - ap_t) as f64;
                self.params.max_ap * (-elapsed / self.params.ap_decay).exp()
            }
            _ => 0.0,
        }
    }
}

impl Cell for ProtoNeuron {
    fn id(&self) -> CellId {
        self.id
    }

    fn output(&self) -> u8 {
        self.output
    }

    fn attach_dendrite(&mut self, dendrite: Box<dyn Dendrite>) {
        self.dendrite = Some(dendrite);
    }

    fn dendrite(&self) -> Result<&dyn Dendrite> {
        self.dendrite
            .as_deref()
            .ok_or(NeuralError::DendriteMissing(self.id))
    }

    fn add_in_connection(&mut self, connection: ConnectionId) {
        self.inputs.push(connection);
    }

    fn add_out_connection(&mut self, connection: ConnectionId) {
        self.outputs.push(connection);
    }

    fn out_connections(&self) -> &[ConnectionId] {
        &self.outputs
    }

    fn soma_parameters(&self) -> SomaParameters {
        self.params
    }

    fn set_soma_parameters(&mut self, params: SomaParameters) -> Result<()> {
        params.validate()?;
        debug!("[CELL] {} soma parameters {:?} -> {:?}", self.id, self.params, params);
        self.params = params;
        Ok(())
    }

    fn soma_view(&self, tick: u64) -> SomaView {
        SomaView {
            ap_t: self.ap_t,
            prev_ap_t: self.prev_ap_t,
            ap_value: self.ap_value(tick),
        }
    }

    fn process(&mut self, tick: u64, connections: &ConnectionPool) {
        let soma = self.soma_view(tick);
        if let Some(dendrite) = self.dendrite.as_mut() {
            let ctx = ProcessContext {
                tick,
                connections,
                soma,
            };
            dendrite.process(&ctx);
        }
    }

    fn integrate(&mut self, t: f64, connections: &ConnectionPool) -> f64 {
        let drive = match self.dendrite.as_mut() {
            Some(dendrite) => dendrite.integrate(t, connections),
            None => 0.0,
        };

        if drive > self.params.threshold {
            self.output = 1;
            self.prev_ap_t = self.ap_t;
            self.ap_t = Some(t as u64);
        } else {
            self.output = 0;
        }
        drive
    }

    fn emit(&self, connections: &mut ConnectionPool) {
        for &connection in &self.outputs {
            connections.input(connection, self.output);
        }
    }

    fn reset(&mut self) {
        self.output = 0;
        self.ap_t = None;
        self.prev_ap_t = None;
        if let Some(dendrite) = self.dendrite.as_mut() {
            dendrite.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compartment::{Compartment, ProtoCompartment};
    use crate::dendrite::ProtoDendrite;
    use crate::synapse::{
        PlasticityRule, ProtoSynapse, SpikeTiming, Synapse, SynapseType, SynapticState,
    };
    use crate::types::{CompartmentId, DendriteId, SynapseId};
    use std::sync::{Arc, Mutex};

    /// Records the order in which synapses were processed and integrated
    #[derive(Debug, Default)]
    struct PhaseLog {
        events: Mutex<Vec<(u64, &'static str, SynapseId)>>,
    }

    struct LoggingSynapse {
        inner: ProtoSynapse,
        log: Arc<PhaseLog>,
    }

    impl Synapse for LoggingSynapse {
        fn id(&self) -> SynapseId {
            self.inner.id()
        }
        fn compartment(&self) -> CompartmentId {
            self.inner.compartment()
        }
        fn synapse_type(&self) -> SynapseType {
            self.inner.synapse_type()
        }
        fn connection(&self) -> ConnectionId {
            self.inner.connection()
        }
        fn process(&mut self, ctx: &ProcessContext<'_>) {
            self.log.events.lock().unwrap().push((ctx.tick, "process", self.id()));
            self.inner.process(ctx);
        }
        fn integrate(&mut self, t: f64, connections: &ConnectionPool) -> f64 {
            self.log
                .events
                .lock()
                .unwrap()
                .push((t as u64, "integrate", self.id()));
            self.inner.integrate(t, connections)
        }
        fn state(&self) -> &SynapticState {
            self.inner.state()
        }
        fn reset(&mut self) {
            self.inner.reset();
        }
    }

    #[derive(Debug)]
    struct Fixed;

    impl PlasticityRule for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }
        fn process(&self, _state: &mut SynapticState, _timing: &SpikeTiming) {}
    }

    /// One neuron, one dendrite, one compartment, `n` unit-weight excitatory synapses
    fn build(n: u32, threshold: f64, log: &Arc<PhaseLog>) -> (ProtoNeuron, ConnectionPool) {
        let mut pool = ConnectionPool::new();
        let params = SomaParameters {
            threshold,
            ..Default::default()
        };
        let mut neuron = ProtoNeuron::new(CellId(0), params).unwrap();
        let mut dendrite = ProtoDendrite::new(DendriteId(0), neuron.id());
        let mut comp = ProtoCompartment::new(CompartmentId(0), dendrite.id());
        for i in 0..n {
            let conn = pool.add_straight();
            comp.add_synapse(Box::new(LoggingSynapse {
                inner: ProtoSynapse::new(
                    SynapseId(i),
                    comp.id(),
                    SynapseType::Excitatory,
                    conn,
                    SynapticState::new(1.0, 1.0),
                    Arc::new(Fixed),
                ),
                log: Arc::clone(log),
            }));
        }
        dendrite.add_compartment(Box::new(comp));
        neuron.attach_dendrite(Box::new(dendrite));
        (neuron, pool)
    }

    fn tick(neuron: &mut ProtoNeuron, pool: &mut ConnectionPool, t: u64, active: &[u32]) -> f64 {
        for &i in active {
            pool.input(ConnectionId(i), 1);
        }
        neuron.process(t, pool);
        let drive = neuron.integrate(t as f64, pool);
        pool.post_all();
        drive
    }

    #[test]
    fn test_fires_above_threshold() {
        let log = Arc::new(PhaseLog::default());
        let (mut neuron, mut pool) = build(3, 2.0, &log);

        assert_eq!(tick(&mut neuron, &mut pool, 0, &[0, 1]), 2.0);
        assert_eq!(neuron.output(), 0);

        assert_eq!(tick(&mut neuron, &mut pool, 1, &[0, 1, 2]), 3.0);
        assert_eq!(neuron.output(), 1);
        assert_eq!(neuron.soma_view(1).ap_t, Some(1));

        tick(&mut neuron, &mut pool, 2, &[]);
        assert_eq!(neuron.output(), 0);
    }

    #[test]
    fn test_ap_history_and_decay() {
        let log = Arc::new(PhaseLog::default());
        let (mut neuron, mut pool) = build(1, 0.5, &log);
        tick(&mut neuron, &mut pool, 3, &[0]);
        tick(&mut neuron, &mut pool, 7, &[0]);

        let view = neuron.soma_view(17);
        assert_eq!(view.ap_t, Some(7));
        assert_eq!(view.prev_ap_t, Some(3));
        let expected = (-1.0f64).exp();
        assert!((view.ap_value - expected).abs() < 1e-12);
        assert_eq!(neuron.soma_view(7).ap_value, 1.0);
    }

    #[test]
    fn test_process_once_before_integrate() {
        let log = Arc::new(PhaseLog::default());
        let (mut neuron, mut pool) = build(2, 10.0, &log);
        for t in 0..3 {
            tick(&mut neuron, &mut pool, t, &[0]);
        }

        let events = log.events.lock().unwrap();
        assert_eq!(events.len(), 3 * 4);
        for t in 0..3u64 {
            let this_tick: Vec<_> = events.iter().filter(|e| e.0 == t).collect();
            assert_eq!(this_tick.len(), 4);
            assert_eq!(this_tick[0].1, "process");
            assert_eq!(this_tick[1].1, "process");
            assert_eq!(this_tick[2].1, "integrate");
            assert_eq!(this_tick[3].1, "integrate");
            assert_eq!(this_tick[0].2, SynapseId(0));
            assert_eq!(this_tick[1].2, SynapseId(1));
        }
    }

    #[test]
    fn test_reset_clears_history_keeps_wiring() {
        let log = Arc::new(PhaseLog::default());
        let (mut neuron, mut pool) = build(2, 0.5, &log);
        let out = pool.add_straight();
        neuron.add_out_connection(out);
        tick(&mut neuron, &mut pool, 0, &[1]);
        assert_eq!(neuron.output(), 1);

        neuron.reset();
        assert_eq!(neuron.output(), 0);
        assert_eq!(neuron.soma_view(0), SomaView::default());
        assert_eq!(neuron.out_connections(), &[out]);
        assert_eq!(neuron.dendrite().unwrap().compartments()[0].synapses().len(), 2);
    }

    #[test]
    fn test_emit_to_out_connections() {
        let log = Arc::new(PhaseLog::default());
        let (mut neuron, mut pool) = build(1, 0.5, &log);
        let out = pool.add_delayed(1);
        neuron.add_out_connection(out);

        pool.input(ConnectionId(0), 1);
        neuron.process(0, &pool);
        neuron.integrate(0.0, &pool);
        neuron.emit(&mut pool);
        pool.post_all();
        assert_eq!(pool.output(out), 1);
    }

    #[test]
    fn test_missing_dendrite() {
        let neuron = ProtoNeuron::new(CellId(4), SomaParameters::default()).unwrap();
        assert_eq!(
            neuron.dendrite().err(),
            Some(NeuralError::DendriteMissing(CellId(4)))
        );
    }

    #[test]
    fn test_invalid_parameters() {
        let params = SomaParameters {
            ap_decay: 0.0,
            ..Default::default()
        };
        assert!(ProtoNeuron::new(CellId(0), params).is_err());
        assert!(SomaParameters::default().validate().is_ok());
    }
}
