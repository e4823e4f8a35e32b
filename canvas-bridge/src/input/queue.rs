use std::collections::VecDeque;

use super::event::InputEvent;

/// Unbounded FIFO between native callbacks and the per-tick dispatcher.
///
/// Both ends run on the frame-loop thread; there is no locking.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<InputEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }

    /// Puts an event back at the head so it is the next one popped.
    pub fn requeue_front(&mut self, event: InputEvent) {
        self.events.push_front(event);
    }

    /// Drops everything queued, returning how many events were discarded.
    pub fn clear(&mut self) -> usize {
        let count = self.events.len();
        self.events.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }
}
