// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later tiers win:
//! 1. TOML file
//! 2. Environment variables
//! 3. CLI arguments

use crate::{ConfigError, ConfigResult, DeuronConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_FILE_NAME: &str = "deuron_configuration.toml";

/// Find the Deuron configuration file
///
/// Search order:
/// 1. `DEURON_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("DEURON_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by DEURON_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        search_paths.extend(cwd.ancestors().skip(1).take(5).map(|p| p.join(CONFIG_FILE_NAME)));
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet DEURON_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML. Call
/// [`crate::validate_config`] on the result before building a simulation.
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<DeuronConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: DeuronConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_into<T: FromStr>(target: &mut T, value: &str) {
    if let Ok(parsed) = value.trim().parse::<T>() {
        *target = parsed;
    }
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `DEURON_RUN_DURATION` -> `simulation.run_duration`
/// - `DEURON_SYNAPSE_COUNT` -> `simulation.synapse_count`
/// - `DEURON_MASTER_SEED` -> `simulation.master_seed`
/// - `DEURON_LOG_LEVEL` -> `logging.level`
/// - `DEURON_PLASTICITY_RULE` -> `plasticity.rule`
///
/// Unparsable numbers are ignored.
pub fn apply_environment_overrides(config: &mut DeuronConfig) {
    if let Ok(value) = env::var("DEURON_RUN_DURATION") {
        parse_into(&mut config.simulation.run_duration, &value);
    }
    if let Ok(value) = env::var("DEURON_SYNAPSE_COUNT") {
        parse_into(&mut config.simulation.synapse_count, &value);
    }
    if let Ok(value) = env::var("DEURON_MASTER_SEED") {
        parse_into(&mut config.simulation.master_seed, &value);
    }
    if let Ok(value) = env::var("DEURON_LOG_LEVEL") {
        config.logging.level = value;
    }
    if let Ok(value) = env::var("DEURON_PLASTICITY_RULE") {
        config.plasticity.rule = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// Keys (e.g. `{"run_duration": "500", "rule": "pair"}`):
/// `run_duration`, `synapse_count`, `master_seed`, `status_interval`,
/// `tick_interval_us`, `threshold`, `rule`, `completion`, `log_level`,
/// `log_dir`, `file_logging`.
pub fn apply_cli_overrides(config: &mut DeuronConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("run_duration") {
        parse_into(&mut config.simulation.run_duration, value);
    }
    if let Some(value) = cli_args.get("synapse_count") {
        parse_into(&mut config.simulation.synapse_count, value);
    }
    if let Some(value) = cli_args.get("master_seed") {
        parse_into(&mut config.simulation.master_seed, value);
    }
    if let Some(value) = cli_args.get("status_interval") {
        parse_into(&mut config.simulation.status_interval, value);
    }
    if let Some(value) = cli_args.get("tick_interval_us") {
        parse_into(&mut config.simulation.tick_interval_us, value);
    }
    if let Some(value) = cli_args.get("threshold") {
        parse_into(&mut config.soma.threshold, value);
    }
    if let Some(value) = cli_args.get("rule") {
        config.plasticity.rule = value.clone();
    }
    if let Some(value) = cli_args.get("completion") {
        config.pattern.completion = value.clone();
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    if let Some(value) = cli_args.get("log_dir") {
        config.logging.log_dir = PathBuf::from(value);
    }
    if let Some(value) = cli_args.get("file_logging") {
        config.logging.file_logging = value.to_lowercase() == "true" || value == "1";
    }
}
