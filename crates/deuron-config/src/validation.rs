// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Every violation is collected so a bad file is reported in one pass.

use crate::{ConfigError, ConfigResult, DeuronConfig};

const KNOWN_RULES: [&str; 2] = ["trace", "pair"];
const KNOWN_POLICIES: [&str; 2] = ["any", "all"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

fn invalid(errors: &mut Vec<ConfigValidationError>, field: &str, reason: &str) {
    errors.push(ConfigValidationError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    });
}

fn require_positive(errors: &mut Vec<ConfigValidationError>, field: &str, value: f64) {
    if !(value > 0.0 && value.is_finite()) {
        invalid(errors, field, "must be positive");
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every violation
pub fn validate_config(config: &DeuronConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_simulation(config, &mut errors);
    validate_generators(config, &mut errors);
    validate_neuron(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_simulation(config: &DeuronConfig, errors: &mut Vec<ConfigValidationError>) {
    let sim = &config.simulation;
    if sim.run_duration == 0 {
        invalid(errors, "simulation.run_duration", "must be greater than 0");
    }
    if sim.synapse_count == 0 {
        invalid(errors, "simulation.synapse_count", "must be greater than 0");
    }
    if !(0.0..=1.0).contains(&sim.excitatory_ratio) {
        invalid(errors, "simulation.excitatory_ratio", "must be between 0.0 and 1.0");
    }
}

fn validate_generators(config: &DeuronConfig, errors: &mut Vec<ConfigValidationError>) {
    require_positive(errors, "poisson.spread", config.poisson.spread);
    require_positive(errors, "pattern.spread", config.pattern.spread);

    let pattern = &config.pattern;
    if !KNOWN_POLICIES.contains(&pattern.completion.trim().to_lowercase().as_str()) {
        invalid(errors, "pattern.completion", "must be 'any' or 'all'");
    }
    if pattern.templates.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "pattern.templates".to_string(),
        });
    }
    for (i, template) in pattern.templates.iter().enumerate() {
        let template = template.trim();
        if template.is_empty() || !template.chars().all(|c| c == '0' || c == '1') {
            invalid(
                errors,
                &format!("pattern.templates[{}]", i),
                "must be a non-empty string of '0' and '1'",
            );
        }
    }
}

fn validate_neuron(config: &DeuronConfig, errors: &mut Vec<ConfigValidationError>) {
    if !config.soma.threshold.is_finite() {
        invalid(errors, "soma.threshold", "must be finite");
    }
    require_positive(errors, "soma.ap_decay", config.soma.ap_decay);
    if config.soma.max_ap < 0.0 {
        invalid(errors, "soma.max_ap", "must not be negative");
    }

    if config.synapse.initial_weight < 0.0 {
        invalid(errors, "synapse.initial_weight", "must not be negative");
    }

    let plasticity = &config.plasticity;
    if !KNOWN_RULES.contains(&plasticity.rule.trim().to_lowercase().as_str()) {
        invalid(errors, "plasticity.rule", "must be 'trace' or 'pair'");
    }
    require_positive(errors, "plasticity.tau_p", plasticity.tau_p);
    require_positive(errors, "plasticity.tau_n", plasticity.tau_n);
    require_positive(errors, "plasticity.tau_y", plasticity.tau_y);
    require_positive(errors, "plasticity.weight_max", plasticity.weight_max);
}
