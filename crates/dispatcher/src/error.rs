//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// The dispatch loop is gone; the event was not queued
    #[error("queue closed for sink '{sink_name}'")]
    QueueClosed { sink_name: String },

    /// The concurrency limiter was closed
    #[error("concurrency limiter closed")]
    LimiterClosed,

    /// Configuration error (from contract)
    #[error("contract error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a queue closed error
    pub fn queue_closed(sink_name: impl Into<String>) -> Self {
        Self::QueueClosed {
            sink_name: sink_name.into(),
        }
    }
}
