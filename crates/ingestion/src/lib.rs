//! # Ingestion
//!
//! Watch feed decoding.
//!
//! Responsibilities:
//! - Decode JSON-lines watch notifications (`ADDED`, `MODIFIED`, `DELETED`, `LIST`)
//! - Keep an informer-style store of the objects seen so far
//! - Drive an `EventObserver` with add / update / delete / list callbacks
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::WatchFeed;
//! use tokio::io::BufReader;
//!
//! let mut feed = WatchFeed::new();
//! let stats = feed.run(BufReader::new(tokio::io::stdin()), &handle, shutdown).await?;
//! ```

mod error;
mod feed;
mod notification;
mod store;

pub use error::{IngestionError, Result};
pub use feed::{FeedStats, WatchFeed};
pub use notification::WatchNotification;
pub use store::ObjectStore;
