//! Batching queue - bounded multi-producer, single-consumer event channel
//!
//! A full queue suspends the producer instead of dropping the event; this is
//! the exporter's only backpressure mechanism.

use contracts::Event;
use tokio::sync::mpsc;

use crate::error::DispatcherError;

/// Create a queue holding at most `capacity` events
///
/// A zero capacity is raised to one.
pub fn event_queue(capacity: usize) -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSender { tx }, EventReceiver { rx })
}

/// Producer side, cloned into every callback
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<Event>,
}

impl EventSender {
    /// Queue an event, waiting while the queue is full
    ///
    /// # Errors
    /// `QueueClosed` when the dispatch loop has gone away
    pub async fn enqueue(&self, sink_name: &str, event: Event) -> Result<(), DispatcherError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| DispatcherError::queue_closed(sink_name))
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Free slots right now
    pub fn available(&self) -> usize {
        self.tx.capacity()
    }

    /// True once the consumer is dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side, owned by the dispatch loop
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::Receiver<Event>,
}

impl EventReceiver {
    /// Next event in FIFO order; `None` once every sender is dropped
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Events waiting in the queue
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
