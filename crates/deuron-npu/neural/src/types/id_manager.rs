// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Id allocation scoped to one simulation instance
//!
//! Each node kind has its own monotonically increasing sequence starting at 0,
//! so synapse `n` and Poisson stream `n` line up as sample lanes. Two
//! simulations built side by side never share counters.

use super::ids::{CellId, CompartmentId, DendriteId, StreamId, StreamKind, SynapseId};

/// Per-simulation id allocator, passed into constructors
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    cells: u32,
    dendrites: u32,
    compartments: u32,
    synapses: u32,
    poisson_streams: u32,
    spike_streams: u32,
    sequencers: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_cell(&mut self) -> CellId {
        CellId(bump(&mut self.cells))
    }

    pub fn next_dendrite(&mut self) -> DendriteId {
        DendriteId(bump(&mut self.dendrites))
    }

    pub fn next_compartment(&mut self) -> CompartmentId {
        CompartmentId(bump(&mut self.compartments))
    }

    pub fn next_synapse(&mut self) -> SynapseId {
        SynapseId(bump(&mut self.synapses))
    }

    pub fn next_stream(&mut self, kind: StreamKind) -> StreamId {
        let counter = match kind {
            StreamKind::Poisson => &mut self.poisson_streams,
            StreamKind::Spike => &mut self.spike_streams,
            StreamKind::Sequencer => &mut self.sequencers,
        };
        StreamId(bump(counter))
    }

    /// Number of synapse ids handed out so far
    pub fn synapse_count(&self) -> u32 {
        self.synapses
    }
}

#[inline]
fn bump(counter: &mut u32) -> u32 {
    let id = *counter;
    *counter += 1;
    id
}
