// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Compartments: ordered groups of synapses

use crate::cell::ProcessContext;
use crate::connection::ConnectionPool;
use crate::synapse::Synapse;
use crate::types::{CompartmentId, DendriteId};

/// Compartment role
pub trait Compartment: Send {
    fn id(&self) -> CompartmentId;

    /// Owning dendrite (lookup only)
    fn dendrite(&self) -> DendriteId;

    fn add_synapse(&mut self, synapse: Box<dyn Synapse>);

    fn synapses(&self) -> &[Box<dyn Synapse>];

    /// Forward `process` to every synapse in insertion order
    fn process(&mut self, ctx: &ProcessContext<'_>);

    /// Sum of every synapse's contribution; 0.0 when empty
    fn integrate(&mut self, t: f64, connections: &ConnectionPool) -> f64;

    fn reset(&mut self);
}

pub struct ProtoCompartment {
    id: CompartmentId,
    dendrite: DendriteId,
    synapses: Vec<Box<dyn Synapse>>,
}

impl ProtoCompartment {
    pub fn new(id: CompartmentId, dendrite: DendriteId) -> Self {
        Self {
            id,
            dendrite,
            synapses: Vec::new(),
        }
    }
}

impl Compartment for ProtoCompartment {
    fn id(&self) -> CompartmentId {
        self.id
    }

    fn dendrite(&self) -> DendriteId {
        self.dendrite
    }

    fn add_synapse(&mut self, synapse: Box<dyn Synapse>) {
        self.synapses.push(synapse);
    }

    fn synapses(&self) -> &[Box<dyn Synapse>] {
        &self.synapses
    }

    fn process(&mut self, ctx: &ProcessContext<'_>) {
        for synapse in &mut self.synapses {
            synapse.process(ctx);
        }
    }

    fn integrate(&mut self, t: f64, connections: &ConnectionPool) -> f64 {
        self.synapses
            .iter_mut()
            .map(|synapse| synapse.integrate(t, connections))
            .sum()
    }

    fn reset(&mut self) {
        for synapse in &mut self.synapses {
            synapse.reset();
        }
    }
}
