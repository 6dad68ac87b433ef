//! Ingestion error types

use thiserror::Error;

/// Watch feed errors
#[derive(Debug, Error)]
pub enum IngestionError {
    /// A line could not be decoded as a watch notification
    #[error("failed to decode line {line}: {message}")]
    Decode {
        /// 1-based line number
        line: u64,
        /// Decoder message
        message: String,
    },

    /// The feed source could not be read
    #[error("failed to read watch feed: {0}")]
    Read(#[from] std::io::Error),
}

impl IngestionError {
    pub fn decode(line: u64, message: impl ToString) -> Self {
        Self::Decode {
            line,
            message: message.to_string(),
        }
    }
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
