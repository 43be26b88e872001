// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Run/reset driver.

Owns one [`Simulation`] and drives it either continuously on a background
thread (run a full duration, reset, repeat) or manually from the caller
(`step`, `run_pause`, `reset`).

Two outbound channels:
- **status**: command replies (`pong`, `loaded`, `Stopped`) and progress lines
- **property events**: `"<Category> <Field>,<value>"` after every property change

A `stop` while the loop runs produces exactly one `Stopped`, sent by the loop
itself after its last tick. Progress lines are skipped while
[`STATUS_BACKLOG`] messages sit unread; replies are always delivered.
*/

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{unbounded, Receiver, Sender};
use deuron_config::DeuronConfig;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::command::{Command, PropertyCommand};
use crate::error::{RunnerError, RunnerResult};
use crate::property_queue::PropertyUpdateQueue;
use crate::samples::SampleSet;
use crate::simulation::Simulation;
use crate::state::{RunnerState, SharedState};

pub const REPLY_STOPPED: &str = "Stopped";
pub const REPLY_PONG: &str = "pong";
pub const REPLY_LOADED: &str = "loaded";

/// Unread status messages past which the loop stops queueing progress lines
pub const STATUS_BACKLOG: usize = 1024;

/// Progress line sent on the status channel
pub fn progress_message(tick: u64, drive: f64) -> String {
    format!("Running ({}) epsp:({:.6})...", tick, drive)
}

pub struct RunResetRunner {
    config: DeuronConfig,
    simulation: Arc<Mutex<Option<Simulation>>>,
    running: Arc<AtomicBool>,
    state: SharedState,
    thread_handle: Option<JoinHandle<()>>,
    status_tx: Sender<String>,
    status_rx: Receiver<String>,
    property_tx: Sender<String>,
    property_rx: Receiver<String>,
    property_queue: PropertyUpdateQueue,
    /// Samples of the last completed run, published by the loop before each reset
    latest_samples: Arc<Mutex<Option<Arc<SampleSet>>>>,
}

impl RunResetRunner {
    pub fn new(config: DeuronConfig) -> Self {
        let (status_tx, status_rx) = unbounded();
        let (property_tx, property_rx) = unbounded();
        Self {
            config,
            simulation: Arc::new(Mutex::new(None)),
            running: Arc::new(AtomicBool::new(false)),
            state: SharedState::new(RunnerState::Idle),
            thread_handle: None,
            status_tx,
            status_rx,
            property_tx,
            property_rx,
            property_queue: PropertyUpdateQueue::new(),
            latest_samples: Arc::new(Mutex::new(None)),
        }
    }

    /// Parse and execute one command-channel line
    ///
    /// A line that does not parse is dropped with a warning; nothing changes.
    pub fn send(&mut self, line: &str) -> RunnerResult<()> {
        let command: Command = match line.parse() {
            Ok(command) => command,
            Err(e) => {
                warn!("[RUN-RESET] Dropped command '{}': {}", line.trim(), e);
                return Err(e.into());
            }
        };
        self.execute(command)
    }

    pub fn execute(&mut self, command: Command) -> RunnerResult<()> {
        debug!("[RUN-RESET] Command: {}", command);
        match command {
            Command::Start => self.start(),
            Command::Stop => {
                self.stop();
                Ok(())
            }
            Command::Ping => {
                self.respond(REPLY_PONG);
                Ok(())
            }
            Command::Load => self.load(),
            Command::Prop(update) => self.change_property(update),
        }
    }

    /// Build a fresh simulation from the configuration, replacing any previous one
    pub fn create(&mut self) -> RunnerResult<()> {
        if self.is_running() {
            return Err(RunnerError::AlreadyRunning);
        }
        let simulation = Simulation::from_config(&self.config)?;
        *self.simulation.lock() = Some(simulation);
        self.property_queue.drain_all();
        self.state.set(RunnerState::Ready);
        info!("[RUN-RESET] Simulation created");
        Ok(())
    }

    fn load(&mut self) -> RunnerResult<()> {
        self.create()?;
        self.respond(REPLY_LOADED);
        Ok(())
    }

    /// Launch the continuous run loop. Resumes an existing simulation at its
    /// current tick, or creates one first.
    pub fn start(&mut self) -> RunnerResult<()> {
        if self.running.load(Ordering::Acquire) {
            return Err(RunnerError::AlreadyRunning);
        }
        if self.simulation.lock().is_none() {
            self.create()?;
        }

        let status_interval = self.config.simulation.status_interval;
        let tick_interval = Duration::from_micros(self.config.simulation.tick_interval_us);
        info!(
            "[RUN-RESET] Starting run loop (status every {} ticks, tick interval {:?})",
            status_interval, tick_interval
        );

        self.running.store(true, Ordering::Release);
        self.state.set(RunnerState::Running);

        let context = LoopContext {
            simulation: Arc::clone(&self.simulation),
            running: Arc::clone(&self.running),
            status_tx: self.status_tx.clone(),
            property_tx: self.property_tx.clone(),
            property_queue: self.property_queue.clone(),
            latest_samples: Arc::clone(&self.latest_samples),
            status_interval,
            tick_interval,
        };

        let spawned = thread::Builder::new()
            .name("deuron-run-loop".to_string())
            .spawn(move || run_loop(context));

        match spawned {
            Ok(handle) => {
                self.thread_handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                self.state.set(RunnerState::Ready);
                Err(RunnerError::Spawn(e.to_string()))
            }
        }
    }

    /// Stop the continuous run loop and wait for it to exit
    ///
    /// Exactly one `Stopped` reaches the status channel per call: from the
    /// loop when it was running, otherwise from here.
    pub fn stop(&mut self) {
        let was_running = self.running.swap(false, Ordering::AcqRel);

        match self.thread_handle.take() {
            Some(handle) => {
                info!("[RUN-RESET] Stopping run loop...");
                if handle.join().is_err() {
                    warn!("[RUN-RESET] Run loop thread panicked");
                    self.respond(REPLY_STOPPED);
                }
                // updates queued after the loop's last drain
                self.apply_queued_properties();
                self.state.set(RunnerState::Paused);
                info!("[RUN-RESET] Run loop stopped");
            }
            None => {
                if was_running {
                    warn!("[RUN-RESET] Running flag set without a loop thread");
                }
                self.respond(REPLY_STOPPED);
            }
        }
    }

    /// Advance one tick manually. A completed run is reset first.
    pub fn step(&mut self) -> RunnerResult<f64> {
        if self.is_running() {
            return Err(RunnerError::AlreadyRunning);
        }
        let mut guard = self.simulation.lock();
        let simulation = guard.as_mut().ok_or(RunnerError::NotCreated)?;
        if simulation.is_complete() {
            publish_samples(&self.latest_samples, simulation);
            simulation.reset();
        }
        let drive = simulation.step();
        self.state.set(RunnerState::Paused);
        Ok(drive)
    }

    /// Run until the current run reaches its duration, then pause. Returns
    /// the number of ticks executed.
    pub fn run_pause(&mut self) -> RunnerResult<u64> {
        if self.is_running() {
            return Err(RunnerError::AlreadyRunning);
        }
        let mut guard = self.simulation.lock();
        let simulation = guard.as_mut().ok_or(RunnerError::NotCreated)?;
        let mut ticks = 0;
        while !simulation.is_complete() {
            simulation.step();
            ticks += 1;
        }
        publish_samples(&self.latest_samples, simulation);
        self.state.set(RunnerState::Paused);
        debug!("[RUN-RESET] Run-pause executed {} ticks", ticks);
        Ok(ticks)
    }

    /// Rewind the simulation to tick 0
    pub fn reset(&mut self) -> RunnerResult<()> {
        if self.is_running() {
            return Err(RunnerError::AlreadyRunning);
        }
        let mut guard = self.simulation.lock();
        let simulation = guard.as_mut().ok_or(RunnerError::NotCreated)?;
        simulation.reset();
        self.state.set(RunnerState::Ready);
        Ok(())
    }

    /// Apply immediately when idle; queue for the loop when running
    pub fn change_property(&mut self, update: PropertyCommand) -> RunnerResult<()> {
        if self.is_running() {
            self.property_queue.push(update);
            return Ok(());
        }
        let mut guard = self.simulation.lock();
        let simulation = guard.as_mut().ok_or(RunnerError::NotCreated)?;
        let event = simulation.change_property(&update)?;
        let _ = self.property_tx.send(event);
        Ok(())
    }

    /// Current value of a property, or an empty string when unknown or no
    /// simulation exists
    pub fn request_property(&self, name: &str) -> String {
        self.simulation
            .lock()
            .as_ref()
            .map(|sim| sim.request_property(name))
            .unwrap_or_default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn state(&self) -> RunnerState {
        self.state.get()
    }

    /// Current tick, if a simulation exists
    pub fn tick(&self) -> Option<u64> {
        self.simulation.lock().as_ref().map(Simulation::tick)
    }

    pub fn config(&self) -> &DeuronConfig {
        &self.config
    }

    /// Replace the configuration used by the next `load`
    pub fn set_config(&mut self, config: DeuronConfig) {
        self.config = config;
    }

    pub fn status_receiver(&self) -> Receiver<String> {
        self.status_rx.clone()
    }

    pub fn property_receiver(&self) -> Receiver<String> {
        self.property_rx.clone()
    }

    /// Samples of the most recently completed run
    pub fn latest_samples(&self) -> Option<Arc<SampleSet>> {
        self.latest_samples.lock().clone()
    }

    /// Run `f` against the simulation while holding its lock
    pub fn with_simulation<R>(&self, f: impl FnOnce(&Simulation) -> R) -> Option<R> {
        self.simulation.lock().as_ref().map(f)
    }

    fn apply_queued_properties(&self) {
        let updates = self.property_queue.drain_all();
        if updates.is_empty() {
            return;
        }
        let mut guard = self.simulation.lock();
        match guard.as_mut() {
            Some(simulation) => apply_updates(simulation, updates, &self.property_tx),
            None => warn!("[RUN-RESET] Dropped {} queued property updates", updates.len()),
        }
    }

    fn respond(&self, message: &str) {
        let _ = self.status_tx.send(message.to_string());
    }
}

impl Drop for RunResetRunner {
    fn drop(&mut self) {
        if self.is_running() {
            self.stop();
        }
    }
}

struct LoopContext {
    simulation: Arc<Mutex<Option<Simulation>>>,
    running: Arc<AtomicBool>,
    status_tx: Sender<String>,
    property_tx: Sender<String>,
    property_queue: PropertyUpdateQueue,
    latest_samples: Arc<Mutex<Option<Arc<SampleSet>>>>,
    status_interval: u64,
    tick_interval: Duration,
}

fn apply_updates(
    simulation: &mut Simulation,
    updates: Vec<PropertyCommand>,
    property_tx: &Sender<String>,
) {
    for update in updates {
        match simulation.change_property(&update) {
            Ok(event) => {
                let _ = property_tx.send(event);
            }
            Err(e) => warn!("[RUN-RESET] Property update rejected: {}", e),
        }
    }
}

fn publish_samples(slot: &Mutex<Option<Arc<SampleSet>>>, simulation: &Simulation) {
    *slot.lock() = Some(Arc::new(simulation.samples().clone()));
}

/// Continuous loop: step to the run duration, publish samples, reset, repeat.
/// The stop flag is checked once per tick boundary.
fn run_loop(ctx: LoopContext) {
    info!("[RUN-RESET] Run loop started");
    let mut runs: u64 = 0;

    while ctx.running.load(Ordering::Acquire) {
        let progress = {
            let mut guard = ctx.simulation.lock();
            let Some(simulation) = guard.as_mut() else {
                warn!("[RUN-RESET] Simulation disappeared; leaving run loop");
                break;
            };

            apply_updates(simulation, ctx.property_queue.drain_all(), &ctx.property_tx);

            if simulation.is_complete() {
                publish_samples(&ctx.latest_samples, simulation);
                simulation.reset();
                runs += 1;
                debug!("[RUN-RESET] Run {} complete; reset", runs);
                None
            } else {
                let tick = simulation.tick();
                let drive = simulation.step();
                (ctx.status_interval > 0 && tick % ctx.status_interval == 0)
                    .then(|| progress_message(tick, drive))
            }
        };

        if let Some(message) = progress {
            if ctx.status_tx.len() < STATUS_BACKLOG {
                let _ = ctx.status_tx.send(message);
            }
        }
        if !ctx.tick_interval.is_zero() {
            thread::sleep(ctx.tick_interval);
        }
    }

    info!("[RUN-RESET] Run loop exited after {} completed runs", runs);
    let _ = ctx.status_tx.send(REPLY_STOPPED.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Direction;
    use crate::property::Property;

    fn quiet_config() -> DeuronConfig {
        let mut config = DeuronConfig::default();
        config.simulation.run_duration = 50;
        config.simulation.status_interval = 0;
        config
    }

    #[test]
    fn test_ping_and_load_replies() {
        let mut runner = RunResetRunner::new(quiet_config());
        let status = runner.status_receiver();
        assert_eq!(runner.state(), RunnerState::Idle);

        runner.send("ping").unwrap();
        assert_eq!(status.recv().unwrap(), REPLY_PONG);

        runner.send("load").unwrap();
        assert_eq!(status.recv().unwrap(), REPLY_LOADED);
        assert_eq!(runner.state(), RunnerState::Ready);
        assert_eq!(runner.tick(), Some(0));
    }

    #[test]
    fn test_manual_modes_need_simulation() {
        let mut runner = RunResetRunner::new(quiet_config());
        assert!(matches!(runner.step(), Err(RunnerError::NotCreated)));
        assert!(matches!(runner.run_pause(), Err(RunnerError::NotCreated)));
        assert_eq!(runner.request_property("Poisson Max"), "");
    }

    #[test]
    fn test_run_pause_then_step_wraps() {
        let mut runner = RunResetRunner::new(quiet_config());
        runner.create().unwrap();

        assert_eq!(runner.run_pause().unwrap(), 50);
        assert_eq!(runner.tick(), Some(50));
        assert_eq!(runner.latest_samples().unwrap().size(), 50);
        assert_eq!(runner.run_pause().unwrap(), 0);

        runner.step().unwrap();
        assert_eq!(runner.tick(), Some(1));
        assert_eq!(runner.state(), RunnerState::Paused);

        runner.reset().unwrap();
        assert_eq!(runner.tick(), Some(0));
    }

    #[test]
    fn test_malformed_command_dropped() {
        let mut runner = RunResetRunner::new(quiet_config());
        runner.create().unwrap();
        assert!(runner.send("prop Poisson Max abc").is_err());
        assert!(runner.send("warp").is_err());
        assert_eq!(runner.request_property("Poisson Max"), "300.000000");
    }

    #[test]
    fn test_idle_property_applies_immediately() {
        let mut runner = RunResetRunner::new(quiet_config());
        let events = runner.property_receiver();
        runner.create().unwrap();

        runner.send("prop Pattern Min 20").unwrap();
        assert_eq!(events.recv().unwrap(), "Pattern Min,20");
        runner
            .change_property(PropertyCommand::Adjust {
                direction: Direction::Up,
                step: 5.0,
            })
            .unwrap();
        assert_eq!(events.recv().unwrap(), "Pattern Min,25.000000");
        assert_eq!(
            runner.with_simulation(|sim| sim.property_value(Property::PatternMin)),
            Some(25.0)
        );
    }

    #[test]
    fn test_progress_message_format() {
        assert_eq!(progress_message(7, 1.5), "Running (7) epsp:(1.500000)...");
    }
}
