//! Informer-style object store

use std::collections::HashMap;

use contracts::Event;

/// Last known state of every watched object, keyed by `Event::object_key`
#[derive(Debug, Default)]
pub struct ObjectStore {
    objects: HashMap<String, Event>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `event`, returning the state it replaces
    pub fn upsert(&mut self, event: Event) -> Option<Event> {
        self.objects.insert(event.object_key(), event)
    }

    /// Forget the object `event` refers to
    pub fn remove(&mut self, event: &Event) -> Option<Event> {
        self.objects.remove(&event.object_key())
    }

    /// Replace the whole store with a fresh listing
    pub fn replace(&mut self, items: &[Event]) {
        self.objects = items
            .iter()
            .map(|event| (event.object_key(), event.clone()))
            .collect();
    }

    pub fn get(&self, key: &str) -> Option<&Event> {
        self.objects.get(key)
    }

    pub fn contains(&self, event: &Event) -> bool {
        self.objects.contains_key(&event.object_key())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
