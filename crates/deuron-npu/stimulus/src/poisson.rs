// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Poisson-like renewal spike source
//!
//! Each tick the inter-spike-interval countdown either fires (at zero: emit 1
//! and draw a new interval) or decrements (emit 0).

use deuron_npu_neural::{ConnectionId, ConnectionPool, StreamId};
use rand_chacha::ChaCha20Rng;
use tracing::trace;

use crate::generator::{broadcast, seeded_rng, IntervalDistribution, PatternStream};

pub const DEFAULT_POISSON_MAX: f64 = 300.0;
pub const DEFAULT_POISSON_SPREAD: f64 = 50.0;
pub const DEFAULT_POISSON_MIN: f64 = 7.0;

#[derive(Debug, Clone)]
pub struct PoissonStream {
    id: StreamId,
    seed: u64,
    rng: ChaCha20Rng,
    distribution: IntervalDistribution,
    isi: u32,
    output: u8,
    connections: Vec<ConnectionId>,
}

impl PoissonStream {
    pub fn new(id: StreamId, seed: u64) -> Self {
        Self::with_distribution(
            id,
            seed,
            IntervalDistribution::new(
                DEFAULT_POISSON_MAX,
                DEFAULT_POISSON_SPREAD,
                DEFAULT_POISSON_MIN,
            ),
        )
    }

    pub fn with_distribution(id: StreamId, seed: u64, distribution: IntervalDistribution) -> Self {
        let mut rng = seeded_rng(seed);
        let isi = distribution.sample(&mut rng);
        Self {
            id,
            seed,
            rng,
            distribution,
            isi,
            output: 0,
            connections: Vec::new(),
        }
    }

    /// Replace all three distribution parameters and restart the sequence
    pub fn initialize(&mut self, max: f64, spread: f64, min: f64) {
        self.distribution = IntervalDistribution::new(max, spread, min);
        self.reset();
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Current countdown until the next spike
    pub fn isi(&self) -> u32 {
        self.isi
    }

    pub fn distribution(&self) -> IntervalDistribution {
        self.distribution
    }

    pub fn max(&self) -> f64 {
        self.distribution.max
    }

    pub fn min(&self) -> f64 {
        self.distribution.min
    }

    pub fn spread(&self) -> f64 {
        self.distribution.spread
    }

    /// Takes effect from the next interval draw
    pub fn set_max(&mut self, value: f64) {
        self.distribution.max = value;
    }

    pub fn set_min(&mut self, value: f64) {
        self.distribution.min = value;
    }

    pub fn set_spread(&mut self, value: f64) {
        self.distribution.spread = value;
    }
}

impl PatternStream for PoissonStream {
    fn id(&self) -> StreamId {
        self.id
    }

    fn step(&mut self, connections: &mut ConnectionPool) -> bool {
        if self.isi == 0 {
            self.output = 1;
            self.isi = self.distribution.sample(&mut self.rng);
            trace!("[POISSON] {} spiked, next isi {}", self.id, self.isi);
        } else {
            self.output = 0;
            self.isi -= 1;
        }
        broadcast(connections, &self.connections, self.output);
        false
    }

    fn output(&self) -> u8 {
        self.output
    }

    /// Noise never completes
    fn is_complete(&self) -> bool {
        false
    }

    fn reset(&mut self) {
        self.rng = seeded_rng(self.seed);
        self.isi = self.distribution.sample(&mut self.rng);
        self.output = 0;
    }

    fn attach(&mut self, connection: ConnectionId) {
        if !self.connections.contains(&connection) {
            self.connections.push(connection);
        }
    }

    fn connections(&self) -> &[ConnectionId] {
        &self.connections
    }
}
