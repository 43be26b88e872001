// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Shared pieces of every generator: the stream role and the interval draw

use deuron_npu_neural::{ConnectionId, ConnectionPool, StreamId};
use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// Role shared by every per-tick spike source
pub trait PatternStream: Send {
    fn id(&self) -> StreamId;

    /// Advance one tick, writing the emitted value into every attached
    /// connection. Returns `true` when the stream reports completion.
    fn step(&mut self, connections: &mut ConnectionPool) -> bool;

    /// Value emitted by the most recent step
    fn output(&self) -> u8;

    fn is_complete(&self) -> bool;

    fn reset(&mut self);

    fn attach(&mut self, connection: ConnectionId);

    fn connections(&self) -> &[ConnectionId];
}

/// Parameters of the exponential interval draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalDistribution {
    pub max: f64,
    pub spread: f64,
    pub min: f64,
}

impl IntervalDistribution {
    pub fn new(max: f64, spread: f64, min: f64) -> Self {
        Self { max, spread, min }
    }

    /// Draw one interval from `rng`
    pub fn sample(&self, rng: &mut ChaCha20Rng) -> u32 {
        generate_interval(rng.gen::<f64>(), self.max, self.spread, self.min)
    }
}

/// `floor(max · e^(−u·max/spread) + min)`, floored at 0
///
/// `u` is a uniform draw in `[0, 1)`.
///
/// # Example
/// ```
/// use deuron_npu_stimulus::generate_interval;
///
/// assert_eq!(generate_interval(0.0, 300.0, 50.0, 7.0), 307);
/// assert_eq!(generate_interval(0.999, 300.0, 50.0, 7.0), 7);
/// ```
#[inline]
pub fn generate_interval(u: f64, max: f64, spread: f64, min: f64) -> u32 {
    let value = (max * (-u * max / spread).exp() + min).floor();
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        value as u32
    }
}

pub(crate) fn seeded_rng(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// `count` independent stream seeds drawn from one master seed
pub fn derive_seeds(master_seed: u64, count: usize) -> Vec<u64> {
    let mut rng = seeded_rng(master_seed);
    (0..count).map(|_| rng.gen::<u64>()).collect()
}

/// Write `value` into every connection in `targets`
#[inline]
pub(crate) fn broadcast(connections: &mut ConnectionPool, targets: &[ConnectionId], value: u8) {
    for &target in targets {
        connections.input(target, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_bounds() {
        for i in 0..100 {
            let u = i as f64 / 100.0;
            let isi = generate_interval(u, 300.0, 50.0, 7.0);
            assert!((7..=307).contains(&isi), "u {} gave {}", u, isi);
        }
    }

    #[test]
    fn test_interval_floors_at_zero() {
        assert_eq!(generate_interval(0.5, 10.0, 5.0, -100.0), 0);
    }

    #[test]
    fn test_interval_decreases_with_u() {
        let low = generate_interval(0.01, 300.0, 50.0, 7.0);
        let high = generate_interval(0.5, 300.0, 50.0, 7.0);
        assert!(low > high);
    }

    #[test]
    fn test_derived_seeds_are_stable_prefixes() {
        let short = derive_seeds(1963, 3);
        let long = derive_seeds(1963, 10);
        assert_eq!(short, long[..3]);
        assert_ne!(long[0], long[1]);
        assert_ne!(derive_seeds(1964, 1), derive_seeds(1963, 1));
    }

    #[test]
    fn test_sample_is_seed_deterministic() {
        let dist = IntervalDistribution::new(300.0, 50.0, 7.0);
        let mut a = seeded_rng(42);
        let mut b = seeded_rng(42);
        for _ in 0..20 {
            assert_eq!(dist.sample(&mut a), dist.sample(&mut b));
        }
    }
}
