//! Feed to TCP Example
//!
//! Replays a watch feed into a TCP sink backed by an in-process collector,
//! so it runs without a cluster or a remote endpoint.
//!
//! Run with: cargo run -p demos --bin feed_to_tcp [feed.jsonl]
//!
//! Without an argument a synthetic feed of 25 events is used.

use std::sync::Arc;

use anyhow::Context;
use contracts::{Event, SinkConfig, SinkKind};
use dispatcher::{create_sink, CancellationToken, ExporterCounters};
use ingestion::WatchFeed;
use observability::LogFormat;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init_tracing(LogFormat::Pretty, "info")?;

    tracing::info!("Starting feed to TCP demo");

    // ==== Stage 1: Local collector ====
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let endpoint = listener.local_addr()?.to_string();
    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let mut lines = BufReader::new(stream).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let _ = line_tx.send(line);
            }
        }
    });
    tracing::info!(endpoint = %endpoint, "Collector listening");

    // ==== Stage 2: Sink ====
    let mut sink = SinkConfig::new(SinkKind::Tcp);
    sink.name = "demo".into();
    sink.endpoint = Some(endpoint);
    sink.common.flush_delay_ms = 200;
    sink.common.max_buffer_size = 10;
    sink.common.max_concurrency = 2;

    let counters = Arc::new(ExporterCounters::new());
    let (handle, engine) = create_sink(&sink, Arc::clone(&counters))?;
    let limiter = engine.limiter().clone();
    let shutdown = CancellationToken::new();
    let engine_task = engine.spawn(shutdown.clone());

    // ==== Stage 3: Feed ====
    let input = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!(path = %path, "Loading watch feed");
            tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {path}"))?
        }
        None => synthetic_feed(25).into_bytes(),
    };

    let feed_stats = WatchFeed::new()
        .run(input.as_slice(), &handle, shutdown.clone())
        .await?;

    // ==== Stage 4: Drain ====
    drop(handle);
    engine_task.await?;
    limiter.wait_idle().await?;

    let snapshot = counters.snapshot();
    let mut delivered = Vec::new();
    while (delivered.len() as u64) < snapshot.succeeded {
        let Ok(Some(line)) =
            tokio::time::timeout(std::time::Duration::from_secs(1), line_rx.recv()).await
        else {
            break;
        };
        let event: Event = serde_json::from_str(&line)?;
        delivered.push(event.metadata.name);
    }

    tracing::info!(
        lines = feed_stats.lines,
        decode_errors = feed_stats.decode_errors,
        received = snapshot.total_received(),
        sent = snapshot.succeeded,
        failed = snapshot.failed,
        capacity_flushes = snapshot.capacity_flushes,
        timeout_flushes = snapshot.timeout_flushes,
        input_closed_flushes = snapshot.input_closed_flushes,
        "Demo finished"
    );
    println!("Collector received {} events", delivered.len());
    for (component, count) in &snapshot.received {
        println!("  {component}: {count}");
    }

    Ok(())
}

fn synthetic_feed(n: usize) -> String {
    const COMPONENTS: [&str; 3] = ["kubelet", "default-scheduler", "replicaset-controller"];

    (0..n)
        .map(|i| {
            let component = COMPONENTS[i % COMPONENTS.len()];
            format!(
                r#"{{"type":"ADDED","object":{{"metadata":{{"name":"demo.{i}","namespace":"default","uid":"demo-{i}"}},"reason":"Demo","message":"synthetic event {i}","count":1,"type":"Normal","source":{{"component":"{component}"}}}}}}"#
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
