// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Property update queue for the continuous run loop.

Property commands that arrive while the loop is running are queued here and
applied between ticks, so a caller never waits on the per-tick simulation lock.
*/

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::command::PropertyCommand;

/// Thread-safe FIFO of pending property commands
///
/// - Caller thread: pushes commands
/// - Run loop: drains everything between two ticks
pub struct PropertyUpdateQueue {
    queue: Arc<Mutex<VecDeque<PropertyCommand>>>,
}

impl PropertyUpdateQueue {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::with_capacity(16))),
        }
    }

    pub fn push(&self, update: PropertyCommand) {
        self.queue.lock().push_back(update);
    }

    /// Take every pending update, oldest first
    pub fn drain_all(&self) -> Vec<PropertyCommand> {
        self.queue.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

impl Default for PropertyUpdateQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for PropertyUpdateQueue {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Direction;

    #[test]
    fn test_clones_share_queue_and_drain_in_order() {
        let queue = PropertyUpdateQueue::new();
        let producer = queue.clone();
        producer.push(PropertyCommand::Adjust {
            direction: Direction::Up,
            step: 1.0,
        });
        producer.push(PropertyCommand::Adjust {
            direction: Direction::Down,
            step: 2.0,
        });
        assert_eq!(queue.len(), 2);

        let drained = queue.drain_all();
        assert_eq!(drained.len(), 2);
        assert!(matches!(
            drained[0],
            PropertyCommand::Adjust {
                direction: Direction::Up,
                ..
            }
        ));
        assert!(producer.is_empty());
    }
}
