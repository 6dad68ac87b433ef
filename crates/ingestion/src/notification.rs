//! Watch notification wire format

use contracts::Event;
use serde::{Deserialize, Serialize};

use crate::error::{IngestionError, Result};

/// One line of the watch feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum WatchNotification {
    Added { object: Event },
    Modified { object: Event },
    Deleted { object: Event },
    List {
        #[serde(default)]
        items: Vec<Event>,
    },
}

impl WatchNotification {
    /// Decode one feed line; blank lines yield `None`
    pub fn parse_line(line_no: u64, line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(line)
            .map(Some)
            .map_err(|e| IngestionError::decode(line_no, e))
    }

    /// Like [`parse_line`](Self::parse_line) for a raw segment; invalid UTF-8 is a decode error
    pub fn parse_bytes(line_no: u64, line: &[u8]) -> Result<Option<Self>> {
        let line = std::str::from_utf8(line).map_err(|e| IngestionError::decode(line_no, e))?;
        Self::parse_line(line_no, line)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Added { .. } => "ADDED",
            Self::Modified { .. } => "MODIFIED",
            Self::Deleted { .. } => "DELETED",
            Self::List { .. } => "LIST",
        }
    }
}
