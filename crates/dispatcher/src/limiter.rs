//! Concurrency limiter - bounds in-flight transmissions

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::DispatcherError;

/// Counting semaphore with `capacity` slots
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// One held slot; released when dropped
///
/// Owned by the transmission task, so completion, failure and panic all
/// release it exactly once.
#[derive(Debug)]
pub struct ConcurrencySlot {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyLimiter {
    /// Create a limiter; a zero capacity is raised to one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a free slot
    pub async fn acquire(&self) -> Result<ConcurrencySlot, DispatcherError> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| DispatcherError::LimiterClosed)?;
        Ok(ConcurrencySlot { _permit: permit })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Slots currently held
    pub fn in_flight(&self) -> usize {
        self.capacity.saturating_sub(self.available())
    }

    /// Wait until every slot is free again
    ///
    /// Only meaningful once nothing acquires new slots.
    pub async fn wait_idle(&self) -> Result<(), DispatcherError> {
        let permits = u32::try_from(self.capacity).unwrap_or(u32::MAX);
        let _all = self
            .semaphore
            .acquire_many(permits)
            .await
            .map_err(|_| DispatcherError::LimiterClosed)?;
        Ok(())
    }
}
