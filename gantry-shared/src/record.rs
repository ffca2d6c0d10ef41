//! Structured log records.
//!
//! The engine's log writer appends one JSON record per line while a
//! container runs; the replay side decodes them back in order. Both sides
//! must agree on this shape, so it lives here.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{GantryError, GantryResult};

/// One stdio direction of a container process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Stdin,
    Stdout,
    Stderr,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Stdin => "stdin",
            Direction::Stdout => "stdout",
            Direction::Stderr => "stderr",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single captured output record.
///
/// Immutable and append-only. `log` holds the captured payload exactly as
/// the process wrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Capture timestamp.
    pub time: DateTime<Utc>,

    /// Direction the payload was captured from.
    pub stream: Direction,

    /// Captured payload.
    pub log: String,
}

impl LogRecord {
    /// Create a record stamped with the current time.
    pub fn new(stream: Direction, log: impl Into<String>) -> Self {
        Self {
            time: Utc::now(),
            stream,
            log: log.into(),
        }
    }

    /// Encode as one JSON line (no trailing newline).
    pub fn to_line(&self) -> GantryResult<String> {
        serde_json::to_string(self)
            .map_err(|e| GantryError::Storage(format!("Failed to encode log record: {}", e)))
    }

    /// Decode from one JSON line.
    pub fn from_line(line: &str) -> GantryResult<Self> {
        serde_json::from_str(line)
            .map_err(|e| GantryError::Storage(format!("Malformed log record: {}", e)))
    }
}
