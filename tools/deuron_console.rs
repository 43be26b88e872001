// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Headless console for the run/reset simulator.
//!
//! Reads commands from stdin, forwards them to the runner and prints every
//! status reply and property event as it arrives.

use std::collections::HashMap;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::thread;

use anyhow::{Context, Result};
use deuron::burst_engine::{RunResetRunner, RunnerError};
use deuron::config::{
    apply_cli_overrides, apply_environment_overrides, load_config, validate_config, ConfigError,
    DeuronConfig,
};
use deuron::observability::{debug_flags_help, init_logging, parse_debug_flags, LoggingOptions};
use tracing::{info, warn};

const COMMANDS: &str = "\
Channel commands:
  start                         start the continuous run/reset loop
  stop                          stop the loop (replies 'Stopped')
  ping                          replies 'pong'
  load                          rebuild the simulation from config (replies 'loaded')
  prop <Category> <Field> <v>   set a property, e.g. 'prop Poisson Max 250'
  prop up|down <step>           re-apply the last property moved by <step>

Console commands:
  step                          advance one tick (loop must be stopped)
  runpause                      run to the end of the current run, then pause
  reset                         rewind to tick 0
  get <Category> <Field>        print a property value
  state                         print runner state and tick
  help                          this text
  quit                          stop and exit";

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: deuron-console [--config <path>] [--<key>=<value> ...] [--debug-<crate> ...]\n\n\
         Override keys: run_duration, synapse_count, master_seed, status_interval,\n\
         tick_interval_us, threshold, rule, completion, log_level, log_dir, file_logging\n\n\
         {}",
        debug_flags_help()
    );
    process::exit(2);
}

fn parse_args() -> (Option<PathBuf>, HashMap<String, String>) {
    let mut config_path = None;
    let mut overrides = HashMap::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                config_path = Some(PathBuf::from(v));
            }
            "-h" | "--help" => usage_and_exit(),
            other if other.starts_with("--debug-") => {}
            other => match other.strip_prefix("--").and_then(|kv| kv.split_once('=')) {
                Some((key, value)) => {
                    overrides.insert(key.replace('-', "_"), value.to_string());
                }
                None => {
                    eprintln!("Unknown argument: {other}");
                    usage_and_exit();
                }
            },
        }
    }

    (config_path, overrides)
}

/// Load the config file, falling back to defaults when none exists. Overrides
/// apply either way.
fn resolve_config(path: Option<PathBuf>, overrides: &HashMap<String, String>) -> Result<DeuronConfig> {
    match load_config(path.as_deref(), Some(overrides)) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) if path.is_none() => {
            let mut config = DeuronConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, overrides);
            validate_config(&config)?;
            Ok(config)
        }
        Err(e) => Err(e).context("failed to load configuration"),
    }
}

fn print_state(runner: &RunResetRunner) {
    match runner.tick() {
        Some(tick) => println!("{} (tick {})", runner.state(), tick),
        None => println!("{}", runner.state()),
    }
}

/// Console-only commands. Returns `false` when the line is not one of them.
fn handle_local(runner: &mut RunResetRunner, line: &str) -> Result<bool, RunnerError> {
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some("step") => {
            let drive = runner.step()?;
            println!("drive {:.6}", drive);
        }
        Some("runpause") => {
            let ticks = runner.run_pause()?;
            println!("ran {} ticks", ticks);
        }
        Some("reset") => runner.reset()?,
        Some("get") => {
            let name = tokens.collect::<Vec<_>>().join(" ");
            let value = runner.request_property(&name);
            if value.is_empty() {
                println!("unknown property '{}'", name);
            } else {
                println!("{} = {}", name, value);
            }
        }
        Some("state") => print_state(runner),
        Some("help") => println!("{}", COMMANDS),
        _ => return Ok(false),
    }
    Ok(true)
}

fn main() -> Result<()> {
    let (config_path, overrides) = parse_args();
    let config = resolve_config(config_path, &overrides)?;

    let debug_flags = parse_debug_flags();
    let options = LoggingOptions {
        level: config.logging.level.clone(),
        log_dir: config.logging.log_dir.clone(),
        file_logging: config.logging.file_logging,
        retention_runs: config.logging.max_runs_kept,
        ..LoggingOptions::default()
    };
    let _log_guard = init_logging(&debug_flags, &options)?;
    info!(
        "deuron-console {} ({} synapses, {} ticks per run)",
        deuron::VERSION,
        config.simulation.synapse_count,
        config.simulation.run_duration
    );

    let mut runner = RunResetRunner::new(config);

    let status = runner.status_receiver();
    let status_printer = thread::Builder::new()
        .name("deuron-status".to_string())
        .spawn(move || {
            for message in status.iter() {
                println!("[status] {}", message);
            }
        })?;
    let events = runner.property_receiver();
    let event_printer = thread::Builder::new()
        .name("deuron-events".to_string())
        .spawn(move || {
            for event in events.iter() {
                println!("[property] {}", event);
            }
        })?;

    println!("{}", COMMANDS);
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        let result = match handle_local(&mut runner, line) {
            Ok(true) => Ok(()),
            Ok(false) => runner.send(line),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!("'{}' failed: {}", line, e);
            eprintln!("error: {}", e);
        }
        io::stdout().flush()?;
    }

    if runner.is_running() {
        runner.stop();
    }
    drop(runner);
    // printers end once the runner's senders are gone
    let _ = status_printer.join();
    let _ = event_printer.join();
    Ok(())
}
