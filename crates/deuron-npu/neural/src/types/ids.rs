// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Identity types for graph nodes, connections and stimulus streams

use core::fmt;

use serde::{Deserialize, Serialize};

macro_rules! graph_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Position of this id in a dense, zero-based collection
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

graph_id!(
    /// Cell ID (unique within one simulation)
    CellId,
    "Cell"
);
graph_id!(
    /// Dendrite ID
    DendriteId,
    "Dendrite"
);
graph_id!(
    /// Compartment ID
    CompartmentId,
    "Compartment"
);
graph_id!(
    /// Synapse ID. Doubles as the sample lane of the synapse's stimulus.
    SynapseId,
    "Synapse"
);
graph_id!(
    /// Connection ID (index into the owning `ConnectionPool`)
    ConnectionId,
    "Connection"
);
graph_id!(
    /// Stimulus stream ID, sequenced per `StreamKind`
    StreamId,
    "Stream"
);

/// Stream families that keep independent id sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Poisson,
    Spike,
    Sequencer,
}
