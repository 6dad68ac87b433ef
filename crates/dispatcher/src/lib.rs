//! # Dispatcher
//!
//! Buffered, concurrency-bounded dispatch engine shared by every sink.
//!
//! Responsibilities:
//! - Accept events from watch callbacks through a bounded queue (backpressure)
//! - Accumulate them into batches, flushed at capacity or after an inactivity delay
//! - Launch at most `max_concurrency` transmissions at a time
//! - Count received / sent / failed entries

pub mod counters;
pub mod engine;
pub mod error;
pub mod factory;
pub mod handle;
pub mod limiter;
pub mod queue;
pub mod sinks;
pub mod timer;

pub use contracts::{Batch, Event, EventObserver, Transmitter};
pub use counters::{CountersSnapshot, ExporterCounters};
pub use engine::{DispatchEngine, FlushReason};
pub use error::DispatcherError;
pub use factory::{create_sink, create_transmitter};
pub use handle::SinkHandle;
pub use limiter::{ConcurrencyLimiter, ConcurrencySlot};
pub use queue::{event_queue, EventReceiver, EventSender};
pub use sinks::{ElasticsearchTransmitter, HttpTransmitter, SinkTransmitter, TcpTransmitter};
pub use timer::FlushTimer;
pub use tokio_util::sync::CancellationToken;
