//! Layered error definitions
//!
//! `ContractError` covers configuration and construction; `DeliveryError`
//! covers a single batch transmission.

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Sink Errors =====
    /// Sink could not be constructed
    #[error("sink '{sink_name}' setup error: {message}")]
    SinkSetup { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sink setup error
    pub fn sink_setup(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkSetup {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}

/// Failure of one batch transmission
///
/// The dispatch engine only checks for presence; the variants exist for
/// logs.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Event could not be encoded
    #[error("serialize error: {0}")]
    Serialize(String),

    /// Destination unreachable
    #[error("connect to '{endpoint}' failed: {message}")]
    Connect { endpoint: String, message: String },

    /// Stream write failed mid-batch
    #[error("write to '{endpoint}' failed: {message}")]
    Write { endpoint: String, message: String },

    /// Request could not be completed
    #[error("request to '{endpoint}' failed: {message}")]
    Request { endpoint: String, message: String },

    /// Destination answered but refused the batch
    #[error("'{endpoint}' rejected batch: {message}")]
    Rejected { endpoint: String, message: String },
}

impl DeliveryError {
    pub fn connect(endpoint: impl Into<String>, message: impl ToString) -> Self {
        Self::Connect {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    pub fn write(endpoint: impl Into<String>, message: impl ToString) -> Self {
        Self::Write {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    pub fn request(endpoint: impl Into<String>, message: impl ToString) -> Self {
        Self::Request {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    pub fn rejected(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }
}

