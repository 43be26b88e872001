// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Run/reset driver state, readable from any thread

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RunnerState {
    /// No simulation created yet
    Idle = 0,
    /// Simulation created, not running
    Ready = 1,
    /// Continuous run loop active
    Running = 2,
    /// Continuous run stopped; tick position kept
    Paused = 3,
}

impl RunnerState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => RunnerState::Ready,
            2 => RunnerState::Running,
            3 => RunnerState::Paused,
            _ => RunnerState::Idle,
        }
    }
}

impl fmt::Display for RunnerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunnerState::Idle => "idle",
            RunnerState::Ready => "ready",
            RunnerState::Running => "running",
            RunnerState::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// Lock-free shared cell holding a [`RunnerState`]
#[derive(Debug, Clone)]
pub(crate) struct SharedState(Arc<AtomicU8>);

impl SharedState {
    pub(crate) fn new(state: RunnerState) -> Self {
        Self(Arc::new(AtomicU8::new(state as u8)))
    }

    pub(crate) fn get(&self) -> RunnerState {
        RunnerState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, state: RunnerState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_state_round_trip() {
        let shared = SharedState::new(RunnerState::Idle);
        let other = shared.clone();
        for state in [
            RunnerState::Ready,
            RunnerState::Running,
            RunnerState::Paused,
            RunnerState::Idle,
        ] {
            shared.set(state);
            assert_eq!(other.get(), state);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(RunnerState::Paused.to_string(), "paused");
    }
}
