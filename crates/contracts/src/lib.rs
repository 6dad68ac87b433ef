//! # Contracts
//!
//! Shared interface contracts for the event exporter.
//! Every other crate depends on this one; it depends on none of them.
//!
//! ## Data flow
//! - `EventObserver` receives watch notifications
//! - events are grouped into `Batch`es by the dispatch engine
//! - a `Transmitter` delivers each batch to its destination

mod batch;
mod config;
mod error;
mod event;
mod observer;
mod sink;

pub use batch::Batch;
pub use config::*;
pub use error::*;
pub use event::*;
pub use observer::{EventObserver, LocalEventObserver};
pub use sink::{LocalTransmitter, Transmitter};
