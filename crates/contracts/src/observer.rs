//! EventObserver trait - watch callback interface
//!
//! The watch collaborator drives the exporter through these four callbacks.

use crate::{Event, EventList};

/// Watch-style observer
///
/// Callbacks may run concurrently; implementations must only touch shared
/// state through thread-safe primitives.
#[trait_variant::make(EventObserver: Send)]
pub trait LocalEventObserver {
    /// A new object appeared
    async fn on_add(&self, event: Event);

    /// An existing object changed; `old` is absent when it was never seen
    async fn on_update(&self, old: Option<&Event>, new: Event);

    /// An object was removed
    async fn on_delete(&self, event: Event);

    /// Initial (or relisted) snapshot
    async fn on_list(&self, list: EventList);
}
