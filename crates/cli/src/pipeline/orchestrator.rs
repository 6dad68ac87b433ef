//! Pipeline orchestrator - wires the watch feed into one sink.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::ExporterConfig;
use dispatcher::{create_sink, CancellationToken, ExporterCounters};
use ingestion::{FeedStats, WatchFeed};
use tokio::io::{AsyncBufRead, BufReader};
use tracing::{info, warn};

use super::PipelineStats;

/// Where the watch feed comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `-` selects stdin, anything else is a path
    pub fn parse(input: &str) -> Self {
        match input {
            "-" => Self::Stdin,
            path => Self::File(PathBuf::from(path)),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated exporter configuration
    pub exporter: ExporterConfig,

    /// Watch feed source
    pub input: InputSource,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until the feed ends or `shutdown` fires
    ///
    /// At end of input the remaining batch is flushed and in-flight
    /// transmissions are awaited, also when the feed stopped on a read
    /// error. On shutdown neither happens.
    pub async fn run(self, shutdown: CancellationToken) -> Result<PipelineStats> {
        let counters = Arc::new(ExporterCounters::new());
        match self.config.input.clone() {
            InputSource::Stdin => {
                self.run_with_reader(BufReader::new(tokio::io::stdin()), counters, shutdown)
                    .await
            }
            InputSource::File(path) => {
                let file = tokio::fs::File::open(&path)
                    .await
                    .with_context(|| format!("Failed to open watch feed {}", path.display()))?;
                self.run_with_reader(BufReader::new(file), counters, shutdown)
                    .await
            }
        }
    }

    async fn run_with_reader<R>(
        self,
        reader: R,
        counters: Arc<ExporterCounters>,
        shutdown: CancellationToken,
    ) -> Result<PipelineStats>
    where
        R: AsyncBufRead + Unpin,
    {
        let start_time = Instant::now();
        let sink_config = &self.config.exporter.sink;

        let (handle, engine) = create_sink(sink_config, Arc::clone(&counters))
            .context("Failed to create sink")?;
        let limiter = engine.limiter().clone();
        let engine_task = engine.spawn(shutdown.clone());

        info!(
            sink = %sink_config.name,
            kind = %sink_config.kind,
            input = ?self.config.input,
            "Pipeline started"
        );

        let mut feed = WatchFeed::new();
        let feed_result = feed
            .run(reader, &handle, shutdown.clone())
            .await
            .context("Watch feed failed");

        // Last handle gone: the engine flushes what it holds and returns
        drop(handle);
        engine_task.await.context("Dispatch loop panicked")?;

        if shutdown.is_cancelled() {
            warn!(
                in_flight = limiter.in_flight(),
                "Stopped by signal, in-flight transmissions abandoned"
            );
        } else {
            limiter
                .wait_idle()
                .await
                .context("Failed to wait for in-flight transmissions")?;
        }

        let feed_stats: FeedStats = feed_result?;
        Ok(PipelineStats {
            sink_name: sink_config.name.clone(),
            sink_kind: sink_config.kind,
            duration: start_time.elapsed(),
            feed: feed_stats,
            counters: counters.snapshot(),
        })
    }
}
