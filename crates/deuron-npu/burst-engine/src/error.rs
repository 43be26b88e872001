// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Engine error types

use deuron_config::ConfigError;
use deuron_npu_neural::NeuralError;
use deuron_npu_plasticity::PlasticityError;
use deuron_npu_stimulus::StimulusError;

use crate::command::CommandError;

/// Failures while assembling or mutating a simulation
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Neural graph error: {0}")]
    Neural(#[from] NeuralError),

    #[error("Stimulus error: {0}")]
    Stimulus(#[from] StimulusError),

    #[error("Plasticity error: {0}")]
    Plasticity(#[from] PlasticityError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),
}

/// Failures of the run/reset driver
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("Continuous run is active; stop it first")]
    AlreadyRunning,

    #[error("No simulation created; send 'load' or 'start' first")]
    NotCreated,

    #[error("Failed to spawn run loop thread: {0}")]
    Spawn(String),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error(transparent)]
    Command(#[from] CommandError),
}

pub type SimulationResult<T> = std::result::Result<T, SimulationError>;
pub type RunnerResult<T> = std::result::Result<T, RunnerError>;
