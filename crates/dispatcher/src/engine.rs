//! Dispatch engine - the per-sink batching loop
//!
//! One loop task owns the buffer and the flush timer. Each flushed batch is
//! handed to a detached task that holds a concurrency slot for the duration
//! of its transmission.

use std::ops::ControlFlow;
use std::sync::Arc;

use contracts::{Batch, Event, SinkCommonConfig, Transmitter};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::counters::ExporterCounters;
use crate::handle::SinkHandle;
use crate::limiter::{ConcurrencyLimiter, ConcurrencySlot};
use crate::queue::{event_queue, EventReceiver};
use crate::timer::FlushTimer;

/// Why a batch was flushed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    /// Buffer reached `max_buffer_size`
    Capacity,
    /// No flush for `flush_delay` since the batch started
    Timeout,
    /// Every producer went away
    InputClosed,
}

impl FlushReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Capacity => "capacity",
            Self::Timeout => "timeout",
            Self::InputClosed => "input_closed",
        }
    }
}

/// Batching loop for one sink
pub struct DispatchEngine<T> {
    name: String,
    config: SinkCommonConfig,
    receiver: EventReceiver,
    buffer: Vec<Event>,
    timer: FlushTimer,
    limiter: ConcurrencyLimiter,
    transmitter: Arc<T>,
    counters: Arc<ExporterCounters>,
}

impl<T> DispatchEngine<T>
where
    T: Transmitter + Sync + 'static,
{
    /// Create an engine and the observer-facing handle feeding it
    ///
    /// The queue holds `max_buffer_size` events; the limiter allows
    /// `max_concurrency` transmissions.
    pub fn new(
        name: impl Into<String>,
        config: SinkCommonConfig,
        transmitter: T,
        counters: Arc<ExporterCounters>,
    ) -> (SinkHandle, Self) {
        let name = name.into();
        let (sender, receiver) = event_queue(config.max_buffer_size);
        let handle = SinkHandle::new(name.clone(), sender, Arc::clone(&counters));

        let engine = Self {
            timer: FlushTimer::new(config.flush_delay()),
            limiter: ConcurrencyLimiter::new(config.max_concurrency),
            buffer: Vec::with_capacity(config.max_buffer_size),
            name,
            config,
            receiver,
            transmitter: Arc::new(transmitter),
            counters,
        };

        (handle, engine)
    }

    /// Sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Limiter shared with launched transmissions
    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    /// Run the dispatch loop
    ///
    /// Returns when `shutdown` is cancelled, without flushing the buffer or
    /// waiting for launched transmissions. Also returns, after flushing,
    /// once every producer handle is dropped.
    #[instrument(name = "dispatch_engine_run", skip(self, shutdown), fields(sink = %self.name))]
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            sink = %self.name,
            transmitter = self.transmitter.name(),
            flush_delay_ms = self.config.flush_delay_ms,
            max_buffer_size = self.config.max_buffer_size,
            max_concurrency = self.config.max_concurrency,
            "Dispatch loop started"
        );

        loop {
            let step = tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!(
                        sink = %self.name,
                        buffered = self.buffer.len(),
                        in_flight = self.limiter.in_flight(),
                        "Stop signal received, in-flight transmissions are not awaited"
                    );
                    ControlFlow::Break(())
                }

                _ = self.timer.fired(), if self.timer.is_armed() => {
                    self.flush(FlushReason::Timeout, &shutdown).await
                }

                next = self.receiver.recv() => match next {
                    Some(event) => self.push(event, &shutdown).await,
                    None => {
                        info!(
                            sink = %self.name,
                            buffered = self.buffer.len(),
                            "Input closed, flushing remaining events"
                        );
                        let _ = self.flush(FlushReason::InputClosed, &shutdown).await;
                        ControlFlow::Break(())
                    }
                },
            };

            if step.is_break() {
                break;
            }
        }

        info!(sink = %self.name, "Dispatch loop stopped");
    }

    /// Spawn the dispatch loop as a background task
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run(shutdown).await;
        })
    }

    async fn push(&mut self, event: Event, shutdown: &CancellationToken) -> ControlFlow<()> {
        self.buffer.push(event);

        if self.buffer.len() >= self.config.max_buffer_size {
            return self.flush(FlushReason::Capacity, shutdown).await;
        }
        if self.buffer.len() == 1 {
            self.timer.arm();
        }
        ControlFlow::Continue(())
    }

    /// Detach the buffer and launch its transmission
    ///
    /// Waits for a concurrency slot, which stalls the loop while the sink is
    /// saturated.
    async fn flush(&mut self, reason: FlushReason, shutdown: &CancellationToken) -> ControlFlow<()> {
        self.timer.disarm();

        if self.buffer.is_empty() {
            debug!(sink = %self.name, reason = reason.as_str(), "Nothing to flush");
            return ControlFlow::Continue(());
        }

        let events = std::mem::replace(
            &mut self.buffer,
            Vec::with_capacity(self.config.max_buffer_size),
        );
        let batch = Batch::new(events);
        self.counters.inc_flush(reason);

        let slot = tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                warn!(
                    sink = %self.name,
                    entries = batch.len(),
                    "Stop signal received while waiting for a concurrency slot, batch abandoned"
                );
                return ControlFlow::Break(());
            }

            slot = self.limiter.acquire() => match slot {
                Ok(slot) => slot,
                Err(e) => {
                    error!(sink = %self.name, error = %e, entries = batch.len(), "Batch abandoned");
                    return ControlFlow::Break(());
                }
            },
        };

        debug!(
            sink = %self.name,
            reason = reason.as_str(),
            entries = batch.len(),
            "Batch flushed"
        );
        self.launch(batch, slot);
        ControlFlow::Continue(())
    }

    /// Detached on purpose: never awaited, not even on shutdown
    fn launch(&self, batch: Batch, slot: ConcurrencySlot) {
        let name = self.name.clone();
        let transmitter = Arc::clone(&self.transmitter);
        let counters = Arc::clone(&self.counters);
        let limiter = self.limiter.clone();

        observability::record_in_flight(&name, limiter.in_flight());

        tokio::spawn(async move {
            transmit_batch(&name, transmitter.as_ref(), &batch, &counters).await;
            drop(slot);
            observability::record_in_flight(&name, limiter.in_flight());
        });
    }
}

async fn transmit_batch<T: Transmitter>(
    sink: &str,
    transmitter: &T,
    batch: &Batch,
    counters: &ExporterCounters,
) {
    debug!(sink, entries = batch.len(), "Sending entries");

    match transmitter.transmit(batch).await {
        Ok(()) => {
            counters.add_succeeded(batch.len());
            debug!(sink, entries = batch.len(), "Entries sent");
        }
        Err(e) => {
            counters.add_failed(batch.len());
            error!(
                sink,
                transmitter = transmitter.name(),
                entries = batch.len(),
                error = %e,
                "Failed to send entries"
            );
        }
    }
}
