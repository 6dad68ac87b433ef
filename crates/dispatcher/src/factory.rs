//! Sink factory - builds the transmitter and engine for a `SinkConfig`

use std::sync::Arc;

use contracts::{SinkConfig, SinkKind};
use tracing::{info, instrument};

use crate::counters::ExporterCounters;
use crate::engine::DispatchEngine;
use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::sinks::{ElasticsearchTransmitter, HttpTransmitter, SinkTransmitter, TcpTransmitter};

/// Create the transmitter variant selected by `config.kind`
#[instrument(
    name = "dispatcher_create_transmitter",
    skip(config),
    fields(sink = %config.name, kind = %config.kind)
)]
pub fn create_transmitter(config: &SinkConfig) -> Result<SinkTransmitter, DispatcherError> {
    let endpoint = config.resolved_endpoint().ok_or_else(|| {
        DispatcherError::sink_creation(&config.name, format!("{} sink requires an endpoint", config.kind))
    })?;

    let transmitter = match config.kind {
        SinkKind::Elasticsearch => {
            ElasticsearchTransmitter::new(&config.name, endpoint, &config.index_prefix)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?
                .into()
        }
        SinkKind::Http => {
            let credentials = config
                .auth
                .as_ref()
                .map(|auth| auth.credentials())
                .transpose()
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            HttpTransmitter::new(&config.name, endpoint, credentials)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?
                .into()
        }
        SinkKind::Tcp => TcpTransmitter::new(&config.name, endpoint).into(),
    };

    Ok(transmitter)
}

/// Create the observer handle and dispatch engine for one sink
///
/// The engine is returned unstarted; call `run` or `spawn` on it. Building
/// does not need a Tokio runtime, running does.
#[instrument(
    name = "dispatcher_create_sink",
    skip(config, counters),
    fields(sink = %config.name, kind = %config.kind)
)]
pub fn create_sink(
    config: &SinkConfig,
    counters: Arc<ExporterCounters>,
) -> Result<(SinkHandle, DispatchEngine<SinkTransmitter>), DispatcherError> {
    let transmitter = create_transmitter(config)?;

    info!(
        sink = %config.name,
        kind = %config.kind,
        endpoint = config.resolved_endpoint().unwrap_or_default(),
        "Sink created"
    );

    Ok(DispatchEngine::new(
        config.name.clone(),
        config.common.clone(),
        transmitter,
        counters,
    ))
}
