//! On-disk log layout shared between the log writer and the replayer.
//!
//! Each container owns one log directory:
//! ```text
//! {root}/
//! ├── records.log       # structured: one JSON record per line
//! ├── raw-stdout.log    # legacy: raw stdout bytes (older containers)
//! └── raw-stderr.log    # legacy: raw stderr bytes (older containers)
//! ```
//! Newly created containers get only `records.log`; containers created
//! before structured logging existed have only the raw files.

use std::path::{Path, PathBuf};

use crate::constants::logs;
use crate::record::Direction;

/// Per-container log directory layout.
#[derive(Debug, Clone)]
pub struct LogLayout {
    root: PathBuf,
}

impl LogLayout {
    /// Create a layout rooted at a container's log directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The log directory itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the structured record log.
    pub fn record_log(&self) -> PathBuf {
        self.root.join(logs::RECORD_FILE)
    }

    /// Path of a legacy raw store for one output direction.
    pub fn legacy_log(&self, direction: Direction) -> PathBuf {
        self.root
            .join(format!("{}-{}.log", logs::LEGACY_PREFIX, direction))
    }
}
