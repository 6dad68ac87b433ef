//! Exporter counters for observability
//!
//! Constructed once per process and shared through `Arc`. Every increment
//! is mirrored to the `metrics` facade so the Prometheus exporter sees the
//! same values.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::engine::FlushReason;

/// Monotonic counters for one exporter
#[derive(Debug, Default)]
pub struct ExporterCounters {
    /// Received events per source component
    received: RwLock<HashMap<String, Arc<AtomicU64>>>,
    /// Events in successful transmissions
    succeeded: AtomicU64,
    /// Events in failed transmissions
    failed: AtomicU64,
    /// Batches flushed because the buffer was full
    capacity_flushes: AtomicU64,
    /// Batches flushed by the inactivity timer
    timeout_flushes: AtomicU64,
    /// Batches flushed because the input ended
    input_closed_flushes: AtomicU64,
}

impl ExporterCounters {
    /// Create a new counter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one received event for `component`
    pub fn inc_received(&self, component: &str) {
        observability::record_received(component);

        let existing = self
            .received
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(component)
            .cloned();

        let counter = match existing {
            Some(counter) => counter,
            None => Arc::clone(
                self.received
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entry(component.to_string())
                    .or_default(),
            ),
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Received count for one component
    pub fn received(&self, component: &str) -> u64 {
        self.received
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(component)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Add `entries` successfully sent events
    pub fn add_succeeded(&self, entries: usize) {
        observability::record_sent(entries);
        self.succeeded.fetch_add(entries as u64, Ordering::Relaxed);
    }

    /// Get successfully sent count
    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    /// Add `entries` events lost to a failed transmission
    pub fn add_failed(&self, entries: usize) {
        observability::record_failed(entries);
        self.failed.fetch_add(entries as u64, Ordering::Relaxed);
    }

    /// Get failed count
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Count one flushed batch
    pub fn inc_flush(&self, reason: FlushReason) {
        observability::record_flush(reason.as_str());
        let counter = match reason {
            FlushReason::Capacity => &self.capacity_flushes,
            FlushReason::Timeout => &self.timeout_flushes,
            FlushReason::InputClosed => &self.input_closed_flushes,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Flushed batch count for one reason
    pub fn flushes(&self, reason: FlushReason) -> u64 {
        match reason {
            FlushReason::Capacity => self.capacity_flushes.load(Ordering::Relaxed),
            FlushReason::Timeout => self.timeout_flushes.load(Ordering::Relaxed),
            FlushReason::InputClosed => self.input_closed_flushes.load(Ordering::Relaxed),
        }
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> CountersSnapshot {
        let received = self
            .received
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(component, count)| (component.clone(), count.load(Ordering::Relaxed)))
            .collect();

        CountersSnapshot {
            received,
            succeeded: self.succeeded(),
            failed: self.failed(),
            capacity_flushes: self.flushes(FlushReason::Capacity),
            timeout_flushes: self.flushes(FlushReason::Timeout),
            input_closed_flushes: self.flushes(FlushReason::InputClosed),
        }
    }
}

/// Snapshot of exporter counters (for reporting)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountersSnapshot {
    pub received: BTreeMap<String, u64>,
    pub succeeded: u64,
    pub failed: u64,
    pub capacity_flushes: u64,
    pub timeout_flushes: u64,
    pub input_closed_flushes: u64,
}

impl CountersSnapshot {
    /// Received events across all components
    pub fn total_received(&self) -> u64 {
        self.received.values().sum()
    }

    /// Batches flushed for any reason
    pub fn total_flushes(&self) -> u64 {
        self.capacity_flushes + self.timeout_flushes + self.input_closed_flushes
    }
}
