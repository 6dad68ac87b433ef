//! SinkHandle - observer-facing side of a dispatch engine

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use contracts::{Event, EventList, EventObserver};
use tracing::{debug, info, instrument, warn};

use crate::counters::ExporterCounters;
use crate::error::DispatcherError;
use crate::queue::EventSender;

/// Cloneable handle that feeds watch notifications into an engine
///
/// Dropping every clone closes the queue, which makes the engine flush
/// what it holds and stop.
#[derive(Clone)]
pub struct SinkHandle {
    name: String,
    sender: EventSender,
    counters: Arc<ExporterCounters>,
    listed: Arc<AtomicBool>,
}

impl SinkHandle {
    pub(crate) fn new(name: String, sender: EventSender, counters: Arc<ExporterCounters>) -> Self {
        Self {
            name,
            sender,
            counters,
            listed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared counters
    pub fn counters(&self) -> &Arc<ExporterCounters> {
        &self.counters
    }

    /// True once a list snapshot has been observed
    pub fn has_listed(&self) -> bool {
        self.listed.load(Ordering::Relaxed)
    }

    /// Count and enqueue one event
    ///
    /// Waits while the queue is full. The received counter is bumped before
    /// waiting, so it also covers events still blocked here.
    #[instrument(
        name = "sink_handle_accept",
        skip(self, event),
        fields(sink = %self.name, event = %event.metadata.name),
        level = "trace"
    )]
    pub async fn accept(&self, event: Event) {
        self.counters.inc_received(event.component());

        match self.sender.enqueue(&self.name, event).await {
            Ok(()) => {}
            Err(DispatcherError::QueueClosed { .. }) => {
                warn!(sink = %self.name, "Dispatch loop stopped, event dropped");
            }
            Err(e) => {
                warn!(sink = %self.name, error = %e, "Event dropped");
            }
        }
    }
}

impl std::fmt::Debug for SinkHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkHandle")
            .field("name", &self.name)
            .field("queue_available", &self.sender.available())
            .finish()
    }
}

impl EventObserver for SinkHandle {
    async fn on_add(&self, event: Event) {
        self.accept(event).await;
    }

    async fn on_update(&self, old: Option<&Event>, new: Event) {
        let previous = old.map(|e| i64::from(e.count)).unwrap_or(0);
        let delta = i64::from(new.count) - previous;
        if delta != 1 {
            debug!(
                sink = %self.name,
                event = %new.metadata.name,
                old_count = previous,
                new_count = new.count,
                delta,
                "Event count changed by more than one"
            );
        }
        self.accept(new).await;
    }

    async fn on_delete(&self, event: Event) {
        debug!(sink = %self.name, event = %event.metadata.name, "Event deleted, ignored");
    }

    async fn on_list(&self, list: EventList) {
        if !self.listed.swap(true, Ordering::Relaxed) {
            info!(sink = %self.name, items = list.items.len(), "Initial event list observed");
        } else {
            debug!(sink = %self.name, items = list.items.len(), "Event list relisted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::event_queue;

    fn event(name: &str, component: &str, count: i32) -> Event {
        let mut event = Event::default();
        event.metadata.name = name.to_string();
        event.source.component = component.to_string();
        event.count = count;
        event
    }

    fn handle(capacity: usize) -> (SinkHandle, crate::queue::EventReceiver) {
        let (sender, receiver) = event_queue(capacity);
        let handle = SinkHandle::new(
            "test".to_string(),
            sender,
            Arc::new(ExporterCounters::new()),
        );
        (handle, receiver)
    }

    #[tokio::test]
    async fn test_add_and_update_enqueue() {
        let (handle, mut receiver) = handle(4);
        let old = event("pod-a.1", "kubelet", 1);

        handle.on_add(old.clone()).await;
        handle.on_update(Some(&old), event("pod-a.1", "kubelet", 4)).await;

        assert_eq!(receiver.recv().await.unwrap().count, 1);
        assert_eq!(receiver.recv().await.unwrap().count, 4);
        assert_eq!(handle.counters().received("kubelet"), 2);
    }

    #[tokio::test]
    async fn test_delete_and_list_do_not_enqueue() {
        let (handle, receiver) = handle(4);

        handle.on_delete(event("gone", "kubelet", 1)).await;
        assert!(!handle.has_listed());
        handle
            .on_list(EventList {
                items: vec![event("x", "kubelet", 1)],
            })
            .await;
        handle.on_list(EventList::default()).await;

        assert!(handle.has_listed());
        assert!(receiver.is_empty());
        assert_eq!(handle.counters().snapshot().total_received(), 0);
    }

    #[tokio::test]
    async fn test_closed_queue_drops_event() {
        let (handle, receiver) = handle(1);
        drop(receiver);

        handle.on_add(event("late", "kubelet", 1)).await;
        assert_eq!(handle.counters().received("kubelet"), 1);
    }
}
