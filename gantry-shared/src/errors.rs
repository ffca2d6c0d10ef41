//! Error types shared across the engine.

use thiserror::Error;

/// Result alias used throughout gantry.
pub type GantryResult<T> = Result<T, GantryError>;

/// Engine-wide error taxonomy.
#[derive(Debug, Error)]
pub enum GantryError {
    /// A requested stdio direction has no acquirable pipe endpoint:
    /// the process was started without that stream, or another session
    /// already holds it.
    #[error("stream unavailable: {0}")]
    StreamUnavailable(String),

    /// An I/O failure during an active relay, not explained by session
    /// teardown. The session is torn down; callers must re-attach.
    #[error("relay failed: {0}")]
    Relay(String),

    /// Log storage could not be read or decoded.
    #[error("log storage error: {0}")]
    Storage(String),

    /// A bounded wait elapsed before the awaited event.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Invariant violation inside the engine.
    #[error("internal error: {0}")]
    Internal(String),
}
