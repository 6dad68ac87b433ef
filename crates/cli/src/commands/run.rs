//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::ExporterConfig;
use dispatcher::CancellationToken;
use tracing::{error, info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{InputSource, Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_exporter(args: &RunArgs) -> Result<()> {
    let config = load_config(args)?;

    info!(
        sink = %config.sink.name,
        kind = %config.sink.kind,
        endpoint = config.sink.resolved_endpoint().unwrap_or_default(),
        flush_delay_ms = config.sink.common.flush_delay_ms,
        max_buffer_size = config.sink.common.max_buffer_size,
        max_concurrency = config.sink.common.max_concurrency,
        "Configuration loaded"
    );

    if let Some(port) = config.metrics.enabled_port() {
        observability::init_metrics_only(port)?;
        info!("Metrics endpoint available on port {}", port);
    }

    let shutdown = CancellationToken::new();
    let signal_task = tokio::spawn(cancel_on_signal(shutdown.clone()));

    let pipeline = Pipeline::new(PipelineConfig {
        exporter: config,
        input: InputSource::parse(&args.input),
    });

    info!("Starting exporter...");
    let stats = pipeline
        .run(shutdown)
        .await
        .context("Exporter failed")?;
    signal_task.abort();

    info!(
        received = stats.counters.total_received(),
        sent = stats.counters.succeeded,
        failed = stats.counters.failed,
        duration_secs = stats.duration.as_secs_f64(),
        "Exporter finished"
    );
    stats.print_summary();

    Ok(())
}

/// Config file when given, flags otherwise; validated either way
fn load_config(args: &RunArgs) -> Result<ExporterConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => {
            let config = args.to_config();
            config_loader::validate(&config).context("Invalid sink flags")?;
            config
        }
    };

    if let Some(port) = args.metrics_port {
        info!(port, "Overriding metrics port from CLI");
        config.metrics.port = Some(port);
    }

    Ok(config)
}

/// Cancel `shutdown` on Ctrl+C or SIGTERM
async fn cancel_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("Received Ctrl+C, stopping exporter..."),
        _ = terminate => warn!("Received SIGTERM, stopping exporter..."),
    }

    shutdown.cancel();
}
