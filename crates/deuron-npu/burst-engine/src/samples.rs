// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-tick spike samples for an external recorder or renderer
//!
//! The simulation calls [`SampleSink::put`] once per active producer per tick.
//! [`SampleSet`] is the built-in sink: one fixed-size lane per producer and
//! category, sized to the run duration.

use serde::{Deserialize, Serialize};

/// Sample category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SampleKey {
    Cell = 0,
    Poisson = 3,
    Stimulus = 4,
}

impl SampleKey {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// One recorded value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spike {
    pub time: u64,
    pub value: u8,
    pub id: u32,
    pub key: SampleKey,
}

/// Receiver of per-tick samples; must not block
pub trait SampleSink {
    fn put(&mut self, time: u64, value: u8, source: u32, key: SampleKey);
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SampleSink for NullSink {
    fn put(&mut self, _time: u64, _value: u8, _source: u32, _key: SampleKey) {}
}

/// Spike train of one producer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleLane {
    pub id: u32,
    pub samples: Vec<Spike>,
}

impl SampleLane {
    fn new(id: u32, key: SampleKey, size: usize) -> Self {
        let blank = Spike {
            time: 0,
            value: 0,
            id,
            key,
        };
        Self {
            id,
            samples: vec![blank; size],
        }
    }

    /// Just the values, in time order
    pub fn values(&self) -> Vec<u8> {
        self.samples.iter().map(|s| s.value).collect()
    }
}

/// Samples for one run, indexed by tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    size: u64,
    pub poisson: Vec<SampleLane>,
    pub stimulus: Vec<SampleLane>,
    pub cell: Vec<SampleLane>,
}

impl SampleSet {
    pub fn new(size: u64, poisson_lanes: usize, stimulus_lanes: usize, cell_lanes: usize) -> Self {
        let lanes = |count: usize, key: SampleKey| -> Vec<SampleLane> {
            (0..count)
                .map(|id| SampleLane::new(id as u32, key, size as usize))
                .collect()
        };
        Self {
            size,
            poisson: lanes(poisson_lanes, SampleKey::Poisson),
            stimulus: lanes(stimulus_lanes, SampleKey::Stimulus),
            cell: lanes(cell_lanes, SampleKey::Cell),
        }
    }

    /// Number of ticks per lane
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn lanes(&self, key: SampleKey) -> &[SampleLane] {
        match key {
            SampleKey::Cell => &self.cell,
            SampleKey::Poisson => &self.poisson,
            SampleKey::Stimulus => &self.stimulus,
        }
    }

    pub fn lane(&self, key: SampleKey, id: u32) -> Option<&SampleLane> {
        self.lanes(key).get(id as usize)
    }

    /// Zero every recorded value
    pub fn clear(&mut self) {
        for lane in self
            .poisson
            .iter_mut()
            .chain(self.stimulus.iter_mut())
            .chain(self.cell.iter_mut())
        {
            for spike in &mut lane.samples {
                spike.time = 0;
                spike.value = 0;
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl SampleSink for SampleSet {
    /// # Panics
    /// If `time` is past the run duration or `source` has no lane. Either one
    /// means the driver and the sample set disagree about the run shape.
    fn put(&mut self, time: u64, value: u8, source: u32, key: SampleKey) {
        assert!(
            time < self.size,
            "sample time {} outside run duration {}",
            time,
            self.size
        );
        let lanes = match key {
            SampleKey::Cell => &mut self.cell,
            SampleKey::Poisson => &mut self.poisson,
            SampleKey::Stimulus => &mut self.stimulus,
        };
        let lane_count = lanes.len();
        let lane = lanes
            .get_mut(source as usize)
            .unwrap_or_else(|| panic!("no {:?} lane {} (have {})", key, source, lane_count));
        lane.samples[time as usize] = Spike {
            time,
            value,
            id: source,
            key,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_records_in_lane() {
        let mut set = SampleSet::new(5, 2, 1, 1);
        set.put(3, 1, 1, SampleKey::Poisson);
        set.put(0, 1, 0, SampleKey::Cell);

        assert_eq!(set.lane(SampleKey::Poisson, 1).unwrap().values(), vec![0, 0, 0, 1, 0]);
        assert_eq!(set.lane(SampleKey::Poisson, 0).unwrap().values(), vec![0; 5]);
        assert_eq!(set.cell[0].samples[0].key, SampleKey::Cell);
    }

    #[test]
    #[should_panic(expected = "outside run duration")]
    fn test_out_of_range_time_panics() {
        let mut set = SampleSet::new(5, 1, 1, 1);
        set.put(5, 1, 0, SampleKey::Stimulus);
    }

    #[test]
    #[should_panic(expected = "no Poisson lane 4")]
    fn test_unknown_lane_panics() {
        let mut set = SampleSet::new(5, 2, 1, 1);
        set.put(0, 1, 4, SampleKey::Poisson);
    }

    #[test]
    fn test_clear() {
        let mut set = SampleSet::new(3, 1, 1, 1);
        set.put(2, 1, 0, SampleKey::Stimulus);
        set.clear();
        assert_eq!(set.stimulus[0].values(), vec![0, 0, 0]);
    }

    #[test]
    fn test_key_codes() {
        assert_eq!(SampleKey::Cell.code(), 0);
        assert_eq!(SampleKey::Poisson.code(), 3);
        assert_eq!(SampleKey::Stimulus.code(), 4);
    }

    #[test]
    fn test_json_shape() {
        let mut set = SampleSet::new(2, 1, 0, 1);
        set.put(1, 1, 0, SampleKey::Poisson);
        let json: serde_json::Value = serde_json::from_str(&set.to_json().unwrap()).unwrap();
        assert_eq!(json["size"], 2);
        assert_eq!(json["poisson"][0]["samples"][1]["value"], 1);
        assert_eq!(json["poisson"][0]["samples"][1]["key"], "Poisson");
    }
}
