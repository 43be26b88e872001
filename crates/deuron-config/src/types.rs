// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to one section of `deuron_configuration.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeuronConfig {
    pub simulation: SimulationConfig,
    pub poisson: PoissonConfig,
    pub pattern: PatternConfig,
    pub soma: SomaConfig,
    pub synapse: SynapseConfig,
    pub plasticity: PlasticityConfig,
    pub logging: LoggingConfig,
}

/// Timeline and graph shape
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Ticks per run; the runner resets once this is reached
    pub run_duration: u64,
    pub synapse_count: usize,
    /// Fraction of synapses created excitatory (rounded down)
    pub excitatory_ratio: f64,
    /// Seeds every per-synapse Poisson stream
    pub master_seed: u64,
    /// Ticks between progress replies (0 = silent)
    pub status_interval: u64,
    /// Wall-clock pause between ticks in continuous run (0 = free-running)
    pub tick_interval_us: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            run_duration: 1000,
            synapse_count: 10,
            excitatory_ratio: 0.8,
            master_seed: 1963,
            status_interval: 1,
            tick_interval_us: 0,
        }
    }
}

impl SimulationConfig {
    pub fn excitatory_count(&self) -> usize {
        ((self.synapse_count as f64) * self.excitatory_ratio).floor() as usize
    }
}

/// Background noise generators
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PoissonConfig {
    pub max: f64,
    pub spread: f64,
    pub min: f64,
}

impl Default for PoissonConfig {
    fn default() -> Self {
        Self {
            max: 300.0,
            spread: 50.0,
            min: 7.0,
        }
    }
}

/// Pattern sequencer and its spike templates
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PatternConfig {
    pub seed: u64,
    pub max: f64,
    pub spread: f64,
    pub min: f64,
    /// "any" or "all"
    pub completion: String,
    /// One `0`/`1` string per child stream, first character = position 0
    pub templates: Vec<String>,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            seed: 123,
            max: 300.0,
            spread: 50.0,
            min: 50.0,
            completion: "any".to_string(),
            templates: default_templates(),
        }
    }
}

fn default_templates() -> Vec<String> {
    [
        "0000100001001001001000100",
        "0001001000001000100001000",
        "1001000010010010000100001",
        "0100000000010000001001000",
        "0000100001000100000000010",
        "0000100010000000000010000",
        "1000000100000010000000100",
        "0000010001000000010000001",
        "0010000101000100000000001",
        "0000000000010100001001001",
    ]
    .iter()
    .map(|t| t.to_string())
    .collect()
}

/// Threshold and action-potential shape
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SomaConfig {
    pub threshold: f64,
    pub ap_decay: f64,
    pub max_ap: f64,
}

impl Default for SomaConfig {
    fn default() -> Self {
        Self {
            threshold: 2.0,
            ap_decay: 10.0,
            max_ap: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SynapseConfig {
    pub initial_weight: f64,
    /// Connection delay in ticks (0 = straight connection)
    pub delay: usize,
}

impl Default for SynapseConfig {
    fn default() -> Self {
        Self {
            initial_weight: 1.0,
            delay: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlasticityConfig {
    /// "trace" or "pair"
    pub rule: String,
    pub tau_p: f64,
    pub tau_n: f64,
    pub tau_y: f64,
    pub a_plus: f64,
    pub a_minus: f64,
    pub weight_max: f64,
}

impl Default for PlasticityConfig {
    fn default() -> Self {
        Self {
            rule: "trace".to_string(),
            tau_p: 20.0,
            tau_n: 20.0,
            tau_y: 40.0,
            a_plus: 0.01,
            a_minus: 0.012,
            weight_max: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub log_dir: PathBuf,
    pub file_logging: bool,
    /// Run folders kept under `log_dir` (older ones are removed)
    pub max_runs_kept: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("logs"),
            file_logging: false,
            max_runs_kept: 10,
        }
    }
}
