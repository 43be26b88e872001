// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Synaptic computation module
//!
//! A synapse binds exactly one connection. `process` runs first each tick and
//! feeds spike timing into the plasticity hook; `integrate` runs second and
//! returns the signed, weighted drive.

pub mod contribution;
pub mod plasticity;
pub mod proto;

pub use contribution::*;
pub use plasticity::{PlasticityRule, SpikeTiming, SynapticState};
pub use proto::ProtoSynapse;

use crate::cell::ProcessContext;
use crate::connection::ConnectionPool;
use crate::types::{CompartmentId, ConnectionId, SynapseId};

/// Synapse role
pub trait Synapse: Send {
    fn id(&self) -> SynapseId;

    /// Owning compartment (lookup only)
    fn compartment(&self) -> CompartmentId;

    fn synapse_type(&self) -> SynapseType;

    fn connection(&self) -> ConnectionId;

    /// Current output of the bound connection
    fn input(&self, connections: &ConnectionPool) -> u8 {
        connections.output(self.connection())
    }

    /// First pass: plasticity and internal state
    fn process(&mut self, ctx: &ProcessContext<'_>);

    /// Second pass: signed contribution for time `t`
    fn integrate(&mut self, t: f64, connections: &ConnectionPool) -> f64;

    fn state(&self) -> &SynapticState;

    /// Clear per-trial state
    fn reset(&mut self);
}
