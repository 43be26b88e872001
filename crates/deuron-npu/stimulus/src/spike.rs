// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Fixed binary template, played back from the last position toward the first

use std::fmt;

use deuron_npu_neural::{ConnectionId, ConnectionPool, StreamId};

use crate::generator::{broadcast, PatternStream};
use crate::{Result, StimulusError};

#[derive(Debug, Clone)]
pub struct SpikeStream {
    id: StreamId,
    template: Vec<u8>,
    /// Next template position to emit; `None` once playback ran off the front
    cursor: Option<usize>,
    auto_reset: bool,
    complete: bool,
    value: u8,
    connections: Vec<ConnectionId>,
}

impl SpikeStream {
    pub fn new(id: StreamId, template: Vec<u8>) -> Self {
        let cursor = template.len().checked_sub(1);
        Self {
            id,
            template,
            cursor,
            auto_reset: true,
            complete: false,
            value: 0,
            connections: Vec::new(),
        }
    }

    /// Build from a string of `0`/`1` characters, first character = position 0
    pub fn from_template(id: StreamId, template: &str) -> Result<Self> {
        Ok(Self::new(id, parse_template(template)?))
    }

    /// Replace the whole template and rewind
    pub fn set_spikes(&mut self, template: Vec<u8>) {
        self.template = template;
        self.reset();
    }

    pub fn set(&mut self, position: usize) -> Result<()> {
        self.write(position, 1)
    }

    pub fn clear(&mut self, position: usize) -> Result<()> {
        self.write(position, 0)
    }

    /// Set every position in `positions`; nothing changes if any is out of range
    pub fn set_range(&mut self, positions: &[usize]) -> Result<()> {
        if let Some(&bad) = positions.iter().find(|&&p| p >= self.template.len()) {
            return Err(self.out_of_range(bad));
        }
        for &p in positions {
            self.template[p] = 1;
        }
        Ok(())
    }

    fn write(&mut self, position: usize, value: u8) -> Result<()> {
        let len = self.template.len();
        match self.template.get_mut(position) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(StimulusError::PositionOutOfRange { position, len }),
        }
    }

    fn out_of_range(&self, position: usize) -> StimulusError {
        StimulusError::PositionOutOfRange {
            position,
            len: self.template.len(),
        }
    }

    pub fn template(&self) -> &[u8] {
        &self.template
    }

    pub fn len(&self) -> usize {
        self.template.len()
    }

    pub fn is_empty(&self) -> bool {
        self.template.is_empty()
    }

    /// Position the next step will emit
    pub fn index(&self) -> Option<usize> {
        self.cursor
    }

    pub fn auto_reset(&self) -> bool {
        self.auto_reset
    }

    pub fn set_auto_reset(&mut self, auto_reset: bool) {
        self.auto_reset = auto_reset;
    }
}

/// Parse `"0100"` style templates
pub fn parse_template(template: &str) -> Result<Vec<u8>> {
    template
        .trim()
        .chars()
        .map(|c| match c {
            '0' => Ok(0),
            '1' => Ok(1),
            other => Err(StimulusError::InvalidTemplate(other)),
        })
        .collect()
}

impl PatternStream for SpikeStream {
    fn id(&self) -> StreamId {
        self.id
    }

    /// Completion is reported on the step *after* position 0 was emitted; that
    /// step emits nothing. With auto-reset on, the same step rewinds.
    fn step(&mut self, connections: &mut ConnectionPool) -> bool {
        if self.complete {
            return true;
        }
        match self.cursor {
            Some(i) => {
                self.value = self.template[i];
                broadcast(connections, &self.connections, self.value);
                self.cursor = i.checked_sub(1);
                false
            }
            None => {
                if self.auto_reset {
                    self.reset();
                } else {
                    self.complete = true;
                }
                true
            }
        }
    }

    fn output(&self) -> u8 {
        self.value
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn reset(&mut self) {
        self.cursor = self.template.len().checked_sub(1);
        self.value = 0;
        self.complete = false;
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

/// Prints in playback order
impl fmt::Display for SpikeStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.template.iter().rev() {
            write!(f, "{}", bit)?;
        }
        Ok(())
    }
}
