// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Run/reset simulation
//!
//! One neuron, one dendrite, one compartment, `synapse_count` synapses. Every
//! synapse reads a connection fed by its own Poisson noise stream and by one
//! child of the pattern sequencer.
//!
//! Per tick:
//! ```text
//! 1. step Poisson streams, then the sequencer        (generators write inputs)
//! 2. record samples: Poisson, stimulus, cell output  (cell = previous tick)
//! 3. neuron.process(tick)                            (plasticity)
//! 4. drive = neuron.integrate(tick)                  (threshold)
//! 5. neuron.emit, connections.post_all               (cleanup)
//! ```

use std::sync::Arc;

use deuron_config::{validate_config, DeuronConfig};
use deuron_npu_neural::{
    Cell, Compartment, ConnectionId, ConnectionPool, Dendrite, IdAllocator, PlasticityRule,
    Producer, ProtoCompartment, ProtoDendrite, ProtoNeuron, ProtoSynapse, SomaParameters,
    StreamKind, SynapseType, SynapticState,
};
use deuron_npu_plasticity::{create_rule, PlasticityRuleKind, StdpConfig, TraceParameters};
use deuron_npu_stimulus::{
    derive_seeds, CompletionPolicy, IntervalDistribution, PatternSequencer, PatternStream,
    PoissonStream, SpikeStream,
};
use tracing::{debug, info};

use crate::command::{CommandError, PropertyCommand};
use crate::error::SimulationResult;
use crate::property::Property;
use crate::samples::{SampleKey, SampleSet, SampleSink};

pub struct Simulation {
    run_duration: u64,
    tick: u64,
    last_drive: f64,
    neuron: Box<dyn Cell>,
    connections: ConnectionPool,
    synapse_connections: Vec<ConnectionId>,
    poisson: Vec<PoissonStream>,
    poisson_distribution: IntervalDistribution,
    sequencer: PatternSequencer,
    samples: SampleSet,
    rule: Arc<dyn PlasticityRule>,
    last_property: Option<(Property, f64)>,
}

impl Simulation {
    /// Validate `config` and build the graph
    pub fn from_config(config: &DeuronConfig) -> SimulationResult<Self> {
        validate_config(config)?;

        let mut ids = IdAllocator::new();
        let mut connections = ConnectionPool::new();

        let soma = SomaParameters {
            threshold: config.soma.threshold,
            ap_decay: config.soma.ap_decay,
            max_ap: config.soma.max_ap,
        };
        let cell_id = ids.next_cell();
        let mut neuron = ProtoNeuron::new(cell_id, soma)?;
        let mut dendrite = ProtoDendrite::new(ids.next_dendrite(), cell_id);
        let compartment_id = ids.next_compartment();
        let mut compartment = ProtoCompartment::new(compartment_id, dendrite.id());

        let plasticity = &config.plasticity;
        let rule_kind: PlasticityRuleKind = plasticity.rule.parse()?;
        let rule = create_rule(
            rule_kind,
            TraceParameters {
                tau_p: plasticity.tau_p,
                tau_n: plasticity.tau_n,
                tau_y: plasticity.tau_y,
            },
            StdpConfig {
                tau_plus: plasticity.tau_p,
                tau_minus: plasticity.tau_n,
                a_plus: plasticity.a_plus,
                a_minus: plasticity.a_minus,
            },
        );

        let pattern = &config.pattern;
        let mut sequencer = PatternSequencer::with_distribution(
            ids.next_stream(StreamKind::Sequencer),
            pattern.seed,
            IntervalDistribution::new(pattern.max, pattern.spread, pattern.min),
        );
        sequencer.set_policy(pattern.completion.parse::<CompletionPolicy>()?);
        for template in &pattern.templates {
            sequencer.add(SpikeStream::from_template(
                ids.next_stream(StreamKind::Spike),
                template,
            )?);
        }

        let poisson_distribution =
            IntervalDistribution::new(config.poisson.max, config.poisson.spread, config.poisson.min);
        let synapse_count = config.simulation.synapse_count;
        let excitatory = config.simulation.excitatory_count();
        let seeds = derive_seeds(config.simulation.master_seed, synapse_count);

        let mut poisson = Vec::with_capacity(synapse_count);
        let mut synapse_connections = Vec::with_capacity(synapse_count);

        for (i, &seed) in seeds.iter().enumerate() {
            let synapse_id = ids.next_synapse();
            let connection = connections.add_delayed(config.synapse.delay);

            // noise -> connection
            let mut stream =
                PoissonStream::with_distribution(ids.next_stream(StreamKind::Poisson), seed, poisson_distribution);
            stream.attach(connection);

            // pattern -> connection
            let child_index = i % sequencer.len();
            let child = &mut sequencer.streams_mut()[child_index];
            child.attach(connection);
            let child_id = child.id();

            let line = connections.get_mut(connection)?;
            line.attach_producer(Producer::Poisson(stream.id()));
            line.attach_producer(Producer::Spike(child_id));
            line.attach_consumer(synapse_id);

            // connection -> synapse
            let synapse_type = if i < excitatory {
                SynapseType::Excitatory
            } else {
                SynapseType::Inhibitory
            };
            compartment.add_synapse(Box::new(ProtoSynapse::new(
                synapse_id,
                compartment_id,
                synapse_type,
                connection,
                SynapticState::new(config.synapse.initial_weight, plasticity.weight_max),
                Arc::clone(&rule),
            )));
            neuron.add_in_connection(connection);

            poisson.push(stream);
            synapse_connections.push(connection);
        }

        dendrite.add_compartment(Box::new(compartment));
        neuron.attach_dendrite(Box::new(dendrite));

        let run_duration = config.simulation.run_duration;
        let samples = SampleSet::new(run_duration, poisson.len(), sequencer.len(), 1);

        info!(
            "[SIM] Created: {} synapses ({} excitatory), {} patterns, '{}' plasticity, {} ticks per run",
            synapse_count,
            excitatory.min(synapse_count),
            sequencer.len(),
            rule.name(),
            run_duration
        );

        Ok(Self {
            run_duration,
            tick: 0,
            last_drive: 0.0,
            neuron: Box::new(neuron),
            connections,
            synapse_connections,
            poisson,
            poisson_distribution,
            sequencer,
            samples,
            rule,
            last_property: None,
        })
    }

    /// Advance one tick, recording into the built-in sample set
    ///
    /// # Panics
    /// If called once the run is complete; call [`Simulation::reset`] first.
    pub fn step(&mut self) -> f64 {
        let mut samples = std::mem::replace(&mut self.samples, SampleSet::new(0, 0, 0, 0));
        let drive = self.step_with(&mut samples);
        self.samples = samples;
        drive
    }

    /// Advance one tick, recording into `sink`. Returns the integrated drive.
    pub fn step_with(&mut self, sink: &mut dyn SampleSink) -> f64 {
        let t = self.tick;

        for stream in &mut self.poisson {
            stream.step(&mut self.connections);
        }
        self.sequencer.step(&mut self.connections);

        for stream in &self.poisson {
            sink.put(t, stream.output(), stream.id().0, SampleKey::Poisson);
        }
        for stream in self.sequencer.streams() {
            sink.put(t, stream.output(), stream.id().0, SampleKey::Stimulus);
        }
        sink.put(t, self.neuron.output(), self.neuron.id().0, SampleKey::Cell);

        self.neuron.process(t, &self.connections);
        let drive = self.neuron.integrate(t as f64, &self.connections);

        self.neuron.emit(&mut self.connections);
        self.connections.post_all();

        self.tick += 1;
        self.last_drive = drive;
        drive
    }

    /// Rewind to tick 0: generators re-seed, the neuron forgets its spikes,
    /// and in-flight connection values are dropped. Wiring and property values
    /// are kept. Samples are overwritten by the next run.
    pub fn reset(&mut self) {
        debug!("[SIM] Reset at tick {}", self.tick);
        self.tick = 0;
        self.last_drive = 0.0;
        for stream in &mut self.poisson {
            stream.reset();
        }
        self.sequencer.reset();
        self.neuron.reset();
        self.connections.reset_all();
    }

    /// Apply a property command. Returns the change-event text,
    /// e.g. `"Poisson Max,250"`.
    ///
    /// A failed command leaves every property unchanged.
    pub fn change_property(&mut self, command: &PropertyCommand) -> SimulationResult<String> {
        match command {
            PropertyCommand::Set {
                property,
                value,
                text,
            } => {
                self.apply_property(*property, *value)?;
                self.last_property = Some((*property, *value));
                Ok(format!("{},{}", property, text))
            }
            PropertyCommand::Adjust { direction, step } => {
                let (property, last) = self.last_property.ok_or(CommandError::NoPreviousProperty)?;
                let value = direction.apply(last, *step);
                self.apply_property(property, value)?;
                self.last_property = Some((property, value));
                Ok(format!("{},{:.6}", property, value))
            }
        }
    }

    fn apply_property(&mut self, property: Property, value: f64) -> SimulationResult<()> {
        match property {
            Property::PoissonMax => self.poisson_distribution.max = value,
            Property::PoissonMin => self.poisson_distribution.min = value,
            Property::PoissonSpread => self.poisson_distribution.spread = value,
            Property::PatternMax => self.sequencer.set_max(value),
            Property::PatternMin => self.sequencer.set_min(value),
            Property::PatternSpread => self.sequencer.set_spread(value),
            Property::SomaThreshold => {
                let mut params = self.neuron.soma_parameters();
                params.threshold = value;
                self.neuron.set_soma_parameters(params)?;
            }
        }

        let dist = self.poisson_distribution;
        for stream in &mut self.poisson {
            stream.set_max(dist.max);
            stream.set_min(dist.min);
            stream.set_spread(dist.spread);
        }
        debug!("[SIM] {} = {}", property, value);
        Ok(())
    }

    pub fn property_value(&self, property: Property) -> f64 {
        let pattern = self.sequencer.distribution();
        match property {
            Property::PoissonMax => self.poisson_distribution.max,
            Property::PoissonMin => self.poisson_distribution.min,
            Property::PoissonSpread => self.poisson_distribution.spread,
            Property::PatternMax => pattern.max,
            Property::PatternMin => pattern.min,
            Property::PatternSpread => pattern.spread,
            Property::SomaThreshold => self.neuron.soma_parameters().threshold,
        }
    }

    /// Current value with six decimals, or an empty string for an unknown name
    pub fn request_property(&self, name: &str) -> String {
        match name.parse::<Property>() {
            Ok(property) => format!("{:.6}", self.property_value(property)),
            Err(_) => String::new(),
        }
    }

    pub fn last_property(&self) -> Option<(Property, f64)> {
        self.last_property
    }

    /// Ticks completed in the current run
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn run_duration(&self) -> u64 {
        self.run_duration
    }

    pub fn is_complete(&self) -> bool {
        self.tick >= self.run_duration
    }

    /// Drive returned by the most recent integrate
    pub fn last_drive(&self) -> f64 {
        self.last_drive
    }

    pub fn neuron(&self) -> &dyn Cell {
        self.neuron.as_ref()
    }

    pub fn connections(&self) -> &ConnectionPool {
        &self.connections
    }

    /// Connection feeding synapse `i`
    pub fn synapse_connections(&self) -> &[ConnectionId] {
        &self.synapse_connections
    }

    pub fn poisson_streams(&self) -> &[PoissonStream] {
        &self.poisson
    }

    pub fn sequencer(&self) -> &PatternSequencer {
        &self.sequencer
    }

    pub fn sequencer_mut(&mut self) -> &mut PatternSequencer {
        &mut self.sequencer
    }

    pub fn samples(&self) -> &SampleSet {
        &self.samples
    }

    pub fn rule_name(&self) -> &'static str {
        self.rule.name()
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.tick)
            .field("run_duration", &self.run_duration)
            .field("synapses", &self.synapse_connections.len())
            .field("patterns", &self.sequencer.len())
            .field("rule", &self.rule.name())
            .finish()
    }
}
