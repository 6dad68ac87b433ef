//! Pipeline statistics.

use std::time::Duration;

use contracts::SinkKind;
use dispatcher::CountersSnapshot;
use ingestion::FeedStats;

/// Statistics from a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Sink name
    pub sink_name: String,

    /// Sink kind
    pub sink_kind: SinkKind,

    /// Total duration of the run
    pub duration: Duration,

    /// Watch feed statistics
    pub feed: FeedStats,

    /// Exporter counters at exit
    pub counters: CountersSnapshot,
}

impl PipelineStats {
    /// Events per second accepted from the feed
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.counters.total_received() as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Received events neither sent nor failed (abandoned or still in flight)
    pub fn unaccounted(&self) -> u64 {
        self.counters
            .total_received()
            .saturating_sub(self.counters.succeeded + self.counters.failed)
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Event Exporter Summary ===\n");

        println!("Overview");
        println!("  Sink: {} ({})", self.sink_name, self.sink_kind);
        println!("  Duration: {:.2}s", self.duration.as_secs_f64());
        println!("  Throughput: {:.2} events/s", self.throughput());
        if self.feed.interrupted {
            println!("  Stopped by signal");
        }

        println!("\nWatch Feed");
        println!("  Lines: {}", self.feed.lines);
        println!("  Added: {}", self.feed.added);
        println!("  Updated: {}", self.feed.updated);
        println!("  Deleted: {}", self.feed.deleted);
        println!("  Lists: {}", self.feed.lists);
        println!("  Malformed: {}", self.feed.decode_errors);

        println!("\nEntries");
        println!("  Received: {}", self.counters.total_received());
        for (component, count) in &self.counters.received {
            println!("    {}: {}", component, count);
        }
        println!("  Sent: {}", self.counters.succeeded);
        println!("  Failed: {}", self.counters.failed);
        println!("  Unaccounted: {}", self.unaccounted());

        println!("\nBatches");
        println!("  Capacity flushes: {}", self.counters.capacity_flushes);
        println!("  Timeout flushes: {}", self.counters.timeout_flushes);
        println!("  End-of-input flushes: {}", self.counters.input_closed_flushes);

        println!();
    }
}
