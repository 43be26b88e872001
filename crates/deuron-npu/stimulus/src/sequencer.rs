// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Pattern sequencer: a group of spike streams presented in lock-step after a
//! randomized silent inter-trial countdown.

use std::fmt;
use std::str::FromStr;

use deuron_npu_neural::{ConnectionPool, StreamId};
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use crate::generator::{seeded_rng, IntervalDistribution, PatternStream};
use crate::spike::SpikeStream;
use crate::StimulusError;

pub const DEFAULT_PATTERN_SEED: u64 = 123;
pub const DEFAULT_PATTERN_MAX: f64 = 300.0;
pub const DEFAULT_PATTERN_SPREAD: f64 = 50.0;
pub const DEFAULT_PATTERN_MIN: f64 = 50.0;

/// When a presentation ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionPolicy {
    /// First child to complete ends the presentation for all
    #[default]
    Any,
    /// Completed children are held silent until the last one completes
    All,
}

impl CompletionPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            CompletionPolicy::Any => "any",
            CompletionPolicy::All => "all",
        }
    }
}

impl fmt::Display for CompletionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompletionPolicy {
    type Err = StimulusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "any" => Ok(CompletionPolicy::Any),
            "all" => Ok(CompletionPolicy::All),
            other => Err(StimulusError::UnknownPolicy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PatternSequencer {
    id: StreamId,
    seed: u64,
    rng: ChaCha20Rng,
    distribution: IntervalDistribution,
    countdown: u32,
    children: Vec<SpikeStream>,
    held: Vec<bool>,
    policy: CompletionPolicy,
}

impl PatternSequencer {
    pub fn new(id: StreamId, seed: u64) -> Self {
        Self::with_distribution(
            id,
            seed,
            IntervalDistribution::new(DEFAULT_PATTERN_MAX, DEFAULT_PATTERN_SPREAD, DEFAULT_PATTERN_MIN),
        )
    }

    pub fn with_distribution(id: StreamId, seed: u64, distribution: IntervalDistribution) -> Self {
        let mut rng = seeded_rng(seed);
        let countdown = distribution.sample(&mut rng);
        Self {
            id,
            seed,
            rng,
            distribution,
            countdown,
            children: Vec::new(),
            held: Vec::new(),
            policy: CompletionPolicy::default(),
        }
    }

    pub fn id(&self) -> StreamId {
        self.id
    }

    pub fn add(&mut self, child: SpikeStream) {
        self.children.push(child);
        self.held.push(false);
    }

    pub fn streams(&self) -> &[SpikeStream] {
        &self.children
    }

    pub fn streams_mut(&mut self) -> &mut [SpikeStream] {
        &mut self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    /// Override the current inter-trial countdown
    pub fn set_countdown(&mut self, ticks: u32) {
        self.countdown = ticks;
    }

    pub fn policy(&self) -> CompletionPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: CompletionPolicy) {
        self.policy = policy;
    }

    pub fn distribution(&self) -> IntervalDistribution {
        self.distribution
    }

    pub fn set_max(&mut self, value: f64) {
        self.distribution.max = value;
    }

    pub fn set_min(&mut self, value: f64) {
        self.distribution.min = value;
    }

    pub fn set_spread(&mut self, value: f64) {
        self.distribution.spread = value;
    }

    /// True while the inter-trial gap is running
    pub fn is_silent(&self) -> bool {
        self.countdown > 0
    }

    /// Advance one tick. Returns `true` when the presentation ended and the
    /// group was rewound on this tick.
    pub fn step(&mut self, connections: &mut ConnectionPool) -> bool {
        if self.countdown > 0 {
            self.countdown -= 1;
            return false;
        }

        let mut any_complete = false;
        for (child, held) in self.children.iter_mut().zip(self.held.iter_mut()) {
            if *held {
                continue;
            }
            if child.step(connections) {
                any_complete = true;
                *held = true;
            }
        }

        let finished = match self.policy {
            CompletionPolicy::Any => any_complete,
            CompletionPolicy::All => self.held.iter().all(|&h| h),
        };
        if finished {
            self.rewind();
            debug!(
                "[SEQUENCER] {} presentation complete, next in {} ticks",
                self.id, self.countdown
            );
        }
        finished
    }

    /// Re-seed and start over from a fresh countdown
    pub fn reset(&mut self) {
        self.rng = seeded_rng(self.seed);
        self.rewind();
    }

    fn rewind(&mut self) {
        for child in &mut self.children {
            child.reset();
        }
        self.held.iter_mut().for_each(|h| *h = false);
        self.countdown = self.distribution.sample(&mut self.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deuron_npu_neural::ConnectionId;

    fn child(id: u32, template: &str, pool: &mut ConnectionPool) -> (SpikeStream, ConnectionId) {
        let conn = pool.add_straight();
        let mut stream = SpikeStream::from_template(StreamId(id), template).unwrap();
        stream.attach(conn);
        (stream, conn)
    }

    #[test]
    fn test_countdown_gates_children() {
        let mut pool = ConnectionPool::new();
        let mut seq = PatternSequencer::new(StreamId(0), DEFAULT_PATTERN_SEED);
        let (a, _) = child(1, "1111", &mut pool);
        let (b, _) = child(2, "1111", &mut pool);
        seq.add(a);
        seq.add(b);
        seq.set_countdown(3);

        for _ in 0..3 {
            assert!(!seq.step(&mut pool));
            assert!(seq.streams().iter().all(|s| s.index() == Some(3)));
            pool.post_all();
        }

        seq.step(&mut pool);
        assert!(seq.streams().iter().all(|s| s.index() == Some(2)));
        assert!(seq.streams().iter().all(|s| s.output() == 1));
    }

    fn presentation(policy: CompletionPolicy) -> (u32, u32) {
        let mut pool = ConnectionPool::new();
        let mut seq = PatternSequencer::new(StreamId(0), 7);
        seq.set_policy(policy);
        let (short, short_conn) = child(1, "11", &mut pool);
        let (long, long_conn) = child(2, "1111", &mut pool);
        seq.add(short);
        seq.add(long);
        seq.set_countdown(0);

        let (mut short_spikes, mut long_spikes) = (0, 0);
        for _ in 0..10 {
            seq.step(&mut pool);
            short_spikes += u32::from(pool.output(short_conn));
            long_spikes += u32::from(pool.output(long_conn));
            pool.post_all();
        }
        (short_spikes, long_spikes)
    }

    #[test]
    fn test_any_vs_all_with_unequal_children() {
        // The short child completes on tick 2. Under Any the long child has
        // emitted 3 of 4 bits by then. Under All it finishes its template.
        assert_eq!(presentation(CompletionPolicy::Any), (2, 3));
        assert_eq!(presentation(CompletionPolicy::All), (2, 4));
    }

    #[test]
    fn test_group_reset_redraws_countdown() {
        let mut pool = ConnectionPool::new();
        let mut seq = PatternSequencer::new(StreamId(0), 1);
        let (a, _) = child(1, "1", &mut pool);
        seq.add(a);
        seq.set_countdown(0);

        assert!(!seq.step(&mut pool));
        assert!(seq.step(&mut pool));
        assert!(seq.countdown() >= DEFAULT_PATTERN_MIN as u32);
        assert_eq!(seq.streams()[0].index(), Some(0));
    }

    #[test]
    fn test_reset_reseeds() {
        let a = PatternSequencer::new(StreamId(0), 55);
        let mut b = PatternSequencer::new(StreamId(0), 55);
        b.set_countdown(0);
        b.reset();
        assert_eq!(a.countdown(), b.countdown());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("ALL".parse::<CompletionPolicy>(), Ok(CompletionPolicy::All));
        assert_eq!(CompletionPolicy::default(), CompletionPolicy::Any);
        assert!("some".parse::<CompletionPolicy>().is_err());
    }
}
