// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Integration Tests: Run/Reset Lifecycle
//!
//! The background loop seen through its channels:
//! - start → progress → stop → exactly one `Stopped`
//! - manual modes refused while running
//! - property changes queued while running, including at the stop boundary
//! - progress lines bounded for a reader that falls behind
//! - completed runs publish their samples

use std::time::{Duration, Instant};

use crossbeam::channel::Receiver;
use deuron_config::DeuronConfig;
use deuron_npu_burst_engine::{
    RunResetRunner, RunnerError, RunnerState, REPLY_STOPPED, STATUS_BACKLOG,
};

const WAIT: Duration = Duration::from_secs(5);

fn config(run_duration: u64, status_interval: u64) -> DeuronConfig {
    let mut config = DeuronConfig::default();
    config.simulation.run_duration = run_duration;
    config.simulation.status_interval = status_interval;
    config.simulation.tick_interval_us = 100;
    config
}

/// Collect everything already sitting in the channel
fn drain(rx: &Receiver<String>) -> Vec<String> {
    rx.try_iter().collect()
}

#[test]
fn test_stop_yields_exactly_one_stopped() {
    let mut runner = RunResetRunner::new(config(1000, 1));
    let status = runner.status_receiver();

    runner.send("start").unwrap();
    assert_eq!(runner.state(), RunnerState::Running);

    let first = status.recv_timeout(WAIT).expect("no progress from run loop");
    assert!(first.starts_with("Running ("), "unexpected reply: {}", first);

    runner.send("stop").unwrap();
    assert!(!runner.is_running());
    assert_eq!(runner.state(), RunnerState::Paused);

    let replies = drain(&status);
    let stopped = replies.iter().filter(|r| *r == REPLY_STOPPED).count();
    assert_eq!(stopped, 1, "replies: {:?}", replies);
    assert_eq!(replies.last().map(String::as_str), Some(REPLY_STOPPED));

    std::thread::sleep(Duration::from_millis(20));
    assert!(drain(&status).is_empty());
}

#[test]
fn test_stop_when_idle_replies_once() {
    let mut runner = RunResetRunner::new(config(100, 0));
    let status = runner.status_receiver();

    runner.send("stop").unwrap();
    assert_eq!(drain(&status), vec![REPLY_STOPPED.to_string()]);
}

#[test]
fn test_manual_modes_refused_while_running() {
    let mut runner = RunResetRunner::new(config(200, 0));
    let status = runner.status_receiver();
    runner.start().unwrap();

    assert!(matches!(runner.start(), Err(RunnerError::AlreadyRunning)));
    assert!(matches!(runner.step(), Err(RunnerError::AlreadyRunning)));
    assert!(matches!(runner.run_pause(), Err(RunnerError::AlreadyRunning)));
    assert!(matches!(runner.reset(), Err(RunnerError::AlreadyRunning)));
    assert!(matches!(runner.send("load"), Err(RunnerError::AlreadyRunning)));

    runner.stop();
    assert_eq!(drain(&status), vec![REPLY_STOPPED.to_string()]);

    // resumes where it paused
    let paused_at = runner.tick().unwrap();
    runner.step().unwrap();
    assert_eq!(runner.tick().unwrap(), (paused_at % 200) + 1);
}

#[test]
fn test_property_queued_while_running() {
    let mut runner = RunResetRunner::new(config(200, 0));
    let events = runner.property_receiver();
    runner.start().unwrap();

    runner.send("prop Poisson Max 250").unwrap();
    let event = events.recv_timeout(WAIT).expect("no property event");
    assert_eq!(event, "Poisson Max,250");

    runner.send("prop up 10").unwrap();
    assert_eq!(events.recv_timeout(WAIT).unwrap(), "Poisson Max,260.000000");

    runner.stop();
    assert_eq!(runner.request_property("Poisson Max"), "260.000000");
}

#[test]
fn test_property_sent_just_before_stop_is_applied() {
    // one tick every 200 ms: the update lands between two drains
    let mut slow = config(1000, 0);
    slow.simulation.tick_interval_us = 200_000;
    let mut runner = RunResetRunner::new(slow);
    let events = runner.property_receiver();
    runner.start().unwrap();
    std::thread::sleep(Duration::from_millis(50));

    runner.send("prop Poisson Max 250").unwrap();
    runner.stop();
    assert_eq!(drain(&events), vec!["Poisson Max,250".to_string()]);
    assert_eq!(runner.request_property("Poisson Max"), "250.000000");

    // a newer idle value survives the next start/stop
    runner.send("prop Poisson Max 100").unwrap();
    runner.start().unwrap();
    runner.stop();
    assert_eq!(drain(&events), vec!["Poisson Max,100".to_string()]);
    assert_eq!(runner.request_property("Poisson Max"), "100.000000");
}

#[test]
fn test_unread_progress_is_bounded() {
    let mut slow_reader = DeuronConfig::default();
    slow_reader.simulation.status_interval = 1;
    slow_reader.simulation.tick_interval_us = 0;
    let mut runner = RunResetRunner::new(slow_reader);
    let status = runner.status_receiver();

    runner.start().unwrap();
    std::thread::sleep(Duration::from_millis(300));
    runner.send("ping").unwrap();
    runner.stop();

    let replies = drain(&status);
    assert!(replies.len() <= STATUS_BACKLOG + 2, "{} queued", replies.len());
    assert!(replies.iter().any(|r| r == "pong"));
    assert_eq!(replies.last().map(String::as_str), Some(REPLY_STOPPED));
}

#[test]
fn test_completed_runs_publish_samples() {
    let mut runner = RunResetRunner::new(config(20, 0));
    runner.start().unwrap();

    let deadline = Instant::now() + WAIT;
    while runner.latest_samples().is_none() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    runner.stop();

    let samples = runner.latest_samples().expect("no run completed");
    assert_eq!(samples.size(), 20);
    assert_eq!(samples.poisson.len(), 10);
    assert_eq!(samples.stimulus.len(), 10);
    assert_eq!(samples.cell.len(), 1);
    assert!(samples.poisson[0].samples.iter().enumerate().all(|(t, s)| s.time == t as u64));
}
