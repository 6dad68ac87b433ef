//! WatchFeed - replays a JSON-lines watch stream into an observer

use contracts::{EventList, EventObserver};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::notification::WatchNotification;
use crate::store::ObjectStore;

/// Feed statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedStats {
    /// Lines read, blank ones included
    pub lines: u64,
    /// `on_add` callbacks delivered
    pub added: u64,
    /// `on_update` callbacks delivered
    pub updated: u64,
    /// `on_delete` callbacks delivered
    pub deleted: u64,
    /// `on_list` callbacks delivered
    pub lists: u64,
    /// Lines that failed to decode
    pub decode_errors: u64,
    /// True when the feed stopped on the shutdown signal instead of EOF
    pub interrupted: bool,
}

impl FeedStats {
    /// Notifications delivered to the observer
    pub fn delivered(&self) -> u64 {
        self.added + self.updated + self.deleted + self.lists
    }
}

/// Informer over a line-oriented watch stream
#[derive(Debug, Default)]
pub struct WatchFeed {
    store: ObjectStore,
    stats: FeedStats,
}

impl WatchFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Objects currently known
    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub fn stats(&self) -> &FeedStats {
        &self.stats
    }

    /// Read `reader` to EOF (or until `shutdown`), driving `observer`
    ///
    /// Malformed lines are logged and counted, never fatal.
    ///
    /// # Errors
    /// Returns `Read` when the underlying reader fails
    #[instrument(name = "watch_feed_run", skip_all)]
    pub async fn run<R, O>(
        &mut self,
        reader: R,
        observer: &O,
        shutdown: CancellationToken,
    ) -> Result<FeedStats>
    where
        R: AsyncBufRead + Unpin,
        O: EventObserver + Sync,
    {
        let mut segments = reader.split(b'\n');

        loop {
            let next = tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!(lines = self.stats.lines, "Stop signal received, watch feed closed");
                    self.stats.interrupted = true;
                    break;
                }

                next = segments.next_segment() => next?,
            };

            let Some(line) = next else {
                info!(lines = self.stats.lines, "Watch feed reached end of input");
                break;
            };
            self.stats.lines += 1;

            match WatchNotification::parse_bytes(self.stats.lines, &line) {
                Ok(Some(notification)) => self.deliver(notification, observer).await,
                Ok(None) => {}
                Err(e) => {
                    self.stats.decode_errors += 1;
                    observability::record_feed_decode_error();
                    warn!(error = %e, "Skipping malformed watch notification");
                }
            }
        }

        Ok(self.stats.clone())
    }

    /// Apply one notification to the store and the observer
    pub async fn deliver<O>(&mut self, notification: WatchNotification, observer: &O)
    where
        O: EventObserver + Sync,
    {
        debug!(kind = notification.kind(), "Watch notification");

        match notification {
            WatchNotification::Added { object } => match self.store.upsert(object.clone()) {
                None => {
                    self.stats.added += 1;
                    observer.on_add(object).await;
                }
                Some(old) => {
                    self.stats.updated += 1;
                    observer.on_update(Some(&old), object).await;
                }
            },
            WatchNotification::Modified { object } => {
                let old = self.store.upsert(object.clone());
                self.stats.updated += 1;
                observer.on_update(old.as_ref(), object).await;
            }
            WatchNotification::Deleted { object } => {
                self.store.remove(&object);
                self.stats.deleted += 1;
                observer.on_delete(object).await;
            }
            WatchNotification::List { items } => {
                self.store.replace(&items);
                self.stats.lists += 1;
                observer.on_list(EventList { items }).await;
            }
        }
    }
}
