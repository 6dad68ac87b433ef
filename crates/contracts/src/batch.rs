//! Batch - events flushed together

use std::slice;

use crate::Event;

/// Ordered group of events detached from the dispatch buffer
///
/// Read-only once constructed; events keep the order in which they were
/// enqueued.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    events: Vec<Event>,
}

impl Batch {
    /// Wrap buffered events into a batch
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// Number of events in the batch
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when the batch carries no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events in enqueue order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Iterate events in enqueue order
    pub fn iter(&self) -> slice::Iter<'_, Event> {
        self.events.iter()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Event;
    type IntoIter = slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
