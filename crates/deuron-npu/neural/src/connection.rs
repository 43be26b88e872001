// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Connections
//!
//! A connection merges any number of producers (stimulus streams, cell outputs)
//! into one buffered spike value and fans it out to any number of consuming
//! synapses. Within a tick the last `input` wins; simultaneous writes are not
//! queued.
//!
//! ```text
//! tick t:  producers --input--> [pending] --output--> consumers
//!          post_all: update (shift delay line) then post (clear pending)
//! ```
//!
//! A delayed connection with depth N returns at tick t the value injected at
//! tick t-N. Depth 0 behaves exactly like a straight connection.

use std::collections::VecDeque;
use std::fmt;

use crate::types::{CellId, ConnectionId, NeuralError, Result, StreamId, SynapseId};

/// Something that writes into a connection
///
/// Stream ids are sequenced per stream family, so the variant carries the
/// family: `Poisson(StreamId(0))` and `Spike(StreamId(0))` are distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Producer {
    Poisson(StreamId),
    Spike(StreamId),
    Cell(CellId),
}

/// Spike buffer between producers and consuming synapses
pub trait Connection: Send + fmt::Debug {
    /// Inject a spike value, overwriting anything written earlier this tick
    fn input(&mut self, value: u8);

    /// Value visible to consumers this tick (pure read)
    fn output(&self) -> u8;

    /// Advance the delay line one stage (no-op for straight connections)
    fn update(&mut self);

    /// End-of-tick cleanup so the next tick's `input` starts clean
    fn post(&mut self);

    /// Delay depth in ticks
    fn delay(&self) -> usize;

    /// Drop every buffered value, including values still in flight
    fn reset(&mut self);

    fn attach_producer(&mut self, producer: Producer);
    fn attach_consumer(&mut self, consumer: SynapseId);
    fn producers(&self) -> &[Producer];
    fn consumers(&self) -> &[SynapseId];
}

/// Producer/consumer handles shared by both variants
#[derive(Debug, Clone, Default)]
struct Endpoints {
    producers: Vec<Producer>,
    consumers: Vec<SynapseId>,
}

impl Endpoints {
    fn add_producer(&mut self, producer: Producer) {
        if !self.producers.contains(&producer) {
            self.producers.push(producer);
        }
    }

    fn add_consumer(&mut self, consumer: SynapseId) {
        if !self.consumers.contains(&consumer) {
            self.consumers.push(consumer);
        }
    }
}

/// Zero-delay connection
#[derive(Debug, Clone, Default)]
pub struct StraightConnection {
    value: u8,
    endpoints: Endpoints,
}

impl StraightConnection {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Connection for StraightConnection {
    fn input(&mut self, value: u8) {
        self.value = value;
    }

    fn output(&self) -> u8 {
        self.value
    }

    fn update(&mut self) {}

    fn post(&mut self) {
        self.value = 0;
    }

    fn delay(&self) -> usize {
        0
    }

    fn reset(&mut self) {
        self.value = 0;
    }

    fn attach_producer(&mut self, producer: Producer) {
        self.endpoints.add_producer(producer);
    }

    fn attach_consumer(&mut self, consumer: SynapseId) {
        self.endpoints.add_consumer(consumer);
    }

    fn producers(&self) -> &[Producer] {
        &self.endpoints.producers
    }

    fn consumers(&self) -> &[SynapseId] {
        &self.endpoints.consumers
    }
}

/// N-stage delay line
///
/// `line` always holds exactly `delay` values; its front is what consumers
/// see. `pending` collects this tick's input and is shifted in by `update`.
#[derive(Debug, Clone)]
pub struct DelayedConnection {
    pending: u8,
    line: VecDeque<u8>,
    delay: usize,
    endpoints: Endpoints,
}

impl DelayedConnection {
    pub fn new(delay: usize) -> Self {
        Self {
            pending: 0,
            line: VecDeque::from(vec![0; delay]),
            delay,
            endpoints: Endpoints::default(),
        }
    }
}

impl Connection for DelayedConnection {
    fn input(&mut self, value: u8) {
        self.pending = value;
    }

    fn output(&self) -> u8 {
        match self.line.front() {
            Some(&value) => value,
            None => self.pending,
        }
    }

    fn update(&mut self) {
        if self.delay == 0 {
            return;
        }
        self.line.push_back(self.pending);
        self.line.pop_front();
    }

    fn post(&mut self) {
        self.pending = 0;
    }

    fn delay(&self) -> usize {
        self.delay
    }

    fn reset(&mut self) {
        self.pending = 0;
        self.line.iter_mut().for_each(|v| *v = 0);
    }

    fn attach_producer(&mut self, producer: Producer) {
        self.endpoints.add_producer(producer);
    }

    fn attach_consumer(&mut self, consumer: SynapseId) {
        self.endpoints.add_consumer(consumer);
    }

    fn producers(&self) -> &[Producer] {
        &self.endpoints.producers
    }

    fn consumers(&self) -> &[SynapseId] {
        &self.endpoints.consumers
    }
}

/// Arena owning every connection of one simulation
///
/// Producers and consumers refer to connections by `ConnectionId` only. Ids are
/// minted here, so the spike-path accessors (`input`, `output`) treat an
/// unknown id as a silent line instead of failing.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    connections: Vec<Box<dyn Connection>>,
}

impl ConnectionPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, connection: Box<dyn Connection>) -> ConnectionId {
        let id = ConnectionId(self.connections.len() as u32);
        self.connections.push(connection);
        id
    }

    pub fn add_straight(&mut self) -> ConnectionId {
        self.add(Box::new(StraightConnection::new()))
    }

    /// Delay 0 yields a straight connection
    pub fn add_delayed(&mut self, delay: usize) -> ConnectionId {
        if delay == 0 {
            self.add_straight()
        } else {
            self.add(Box::new(DelayedConnection::new(delay)))
        }
    }

    pub fn get(&self, id: ConnectionId) -> Result<&dyn Connection> {
        self.connections
            .get(id.index())
            .map(|c| c.as_ref())
            .ok_or(NeuralError::ConnectionNotFound(id))
    }

    pub fn get_mut(&mut self, id: ConnectionId) -> Result<&mut (dyn Connection + 'static)> {
        self.connections
            .get_mut(id.index())
            .map(|c| c.as_mut())
            .ok_or(NeuralError::ConnectionNotFound(id))
    }

    #[inline]
    pub fn input(&mut self, id: ConnectionId, value: u8) {
        if let Some(connection) = self.connections.get_mut(id.index()) {
            connection.input(value);
        }
    }

    #[inline]
    pub fn output(&self, id: ConnectionId) -> u8 {
        self.connections
            .get(id.index())
            .map_or(0, |connection| connection.output())
    }

    /// Post pass: advance every delay line, then clear pending inputs
    pub fn post_all(&mut self) {
        for connection in &mut self.connections {
            connection.update();
            connection.post();
        }
    }

    /// Silence every connection; wiring is kept
    pub fn reset_all(&mut self) {
        for connection in &mut self.connections {
            connection.reset();
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConnectionId, &dyn Connection)> {
        self.connections
            .iter()
            .enumerate()
            .map(|(i, c)| (ConnectionId(i as u32), c.as_ref()))
    }
}
