// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Dendrites: ordered groups of compartments

use crate::cell::ProcessContext;
use crate::compartment::Compartment;
use crate::connection::ConnectionPool;
use crate::types::{CellId, DendriteId};

/// Dendrite role
pub trait Dendrite: Send {
    fn id(&self) -> DendriteId;

    /// Owning cell (lookup only)
    fn cell(&self) -> CellId;

    fn add_compartment(&mut self, compartment: Box<dyn Compartment>);

    fn compartments(&self) -> &[Box<dyn Compartment>];

    fn process(&mut self, ctx: &ProcessContext<'_>);

    /// Sum of every compartment's integration; 0.0 when empty
    fn integrate(&mut self, t: f64, connections: &ConnectionPool) -> f64;

    fn reset(&mut self);
}

pub struct ProtoDendrite {
    id: DendriteId,
    cell: CellId,
    compartments: Vec<Box<dyn Compartment>>,
}

impl ProtoDendrite {
    pub fn new(id: DendriteId, cell: CellId) -> Self {
        Self {
            id,
            cell,
            compartments: Vec::new(),
        }
    }
}

impl Dendrite for ProtoDendrite {
    fn id(&self) -> DendriteId {
        self.id
    }

    fn cell(&self) -> CellId {
        self.cell
    }

    fn add_compartment(&mut self, compartment: Box<dyn Compartment>) {
        self.compartments.push(compartment);
    }

    fn compartments(&self) -> &[Box<dyn Compartment>] {
        &self.compartments
    }

    fn process(&mut self, ctx: &ProcessContext<'_>) {
        for compartment in &mut self.compartments {
            compartment.process(ctx);
        }
    }

    fn integrate(&mut self, t: f64, connections: &ConnectionPool) -> f64 {
        self.compartments
            .iter_mut()
            .map(|compartment| compartment.integrate(t, connections))
            .sum()
    }

    fn reset(&mut self) {
        for compartment in &mut self.compartments {
            compartment.reset();
        }
    }
}
