use heapless::Deque;

use super::{InputEvent, InputProvider};

/// Bounded FIFO of events pushed by the host between engine ticks.
#[derive(Debug, Clone)]
pub struct QueuedInput<const N: usize> {
    events: Deque<InputEvent, N>,
}

impl<const N: usize> Default for QueuedInput<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> QueuedInput<N> {
    pub const fn new() -> Self {
        Self {
            events: Deque::new(),
        }
    }

    /// Returns the event back when the queue is full.
    pub fn push(&mut self, event: InputEvent) -> Result<(), InputEvent> {
        self.events.push_back(event)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<const N: usize> InputProvider for QueuedInput<N> {
    type Error = core::convert::Infallible;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error> {
        Ok(self.events.pop_front())
    }
}
