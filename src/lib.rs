//! # Deuron - Single-Neuron Run/Reset Spiking Simulator
//!
//! One spiking neuron driven by many independent spike-train generators: a
//! Poisson noise stream per synapse plus a group of fixed binary patterns
//! presented after randomized inter-trial delays. The neuron is run for a fixed
//! duration, reset, and run again with the same seeds, so every trial replays
//! the same stimulus while plasticity shapes the response.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! deuron = "0.1"
//! ```
//!
//! ```rust,no_run
//! use deuron::prelude::*;
//!
//! let config = DeuronConfig::default();
//! let mut sim = Simulation::from_config(&config)?;
//!
//! while !sim.is_complete() {
//!     let drive = sim.step();
//!     println!("t={} drive={:.3} out={}", sim.tick(), drive, sim.neuron().output());
//! }
//! sim.reset(); // next trial replays the same stimulus
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Background run loop
//!
//! ```rust,no_run
//! use deuron::prelude::*;
//!
//! let mut runner = RunResetRunner::new(DeuronConfig::default());
//! let status = runner.status_receiver();
//!
//! runner.send("start")?;
//! println!("{}", status.recv()?);
//! runner.send("prop Poisson Max 250")?;
//! runner.send("stop")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: deuron-config, deuron-observability        │
//! │  (TOML + overrides, tracing init)                       │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Graph: deuron-npu-neural, deuron-npu-plasticity        │
//! │  (Cell, Dendrite, Compartment, Synapse, Connection)     │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Stimulus: deuron-npu-stimulus                          │
//! │  (Poisson stream, spike stream, pattern sequencer)      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Driver: deuron-npu-burst-engine                        │
//! │  (Simulation, samples, run/reset runner, commands)      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

// Re-export foundation
pub use deuron_config as config;
pub use deuron_observability as observability;

// Re-export NPU subsystem
pub use deuron_npu_burst_engine as burst_engine;
pub use deuron_npu_neural as neural;
pub use deuron_npu_plasticity as plasticity;
pub use deuron_npu_stimulus as stimulus;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::{load_config, DeuronConfig};

    pub use crate::neural::{
        Cell, Compartment, Connection, ConnectionPool, Dendrite, Synapse, SynapseType,
    };

    pub use crate::plasticity::{create_rule, PlasticityRuleKind};

    pub use crate::stimulus::{
        CompletionPolicy, PatternSequencer, PatternStream, PoissonStream, SpikeStream,
    };

    pub use crate::burst_engine::{
        Command, Property, PropertyCommand, RunResetRunner, RunnerState, SampleKey, SampleSet,
        SampleSink, Simulation,
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_facade_imports() {
        use crate::prelude::*;
        let config = DeuronConfig::default();
        assert_eq!(config.simulation.synapse_count, 10);
        assert_eq!(SampleKey::Stimulus.code(), 4);
    }
}
