//! Shared constants for the attach and log storage subsystems.
//!
//! These must stay identical between the side that writes (the process
//! supervisor and its log writer) and the side that reads (attach/replay).

/// Interactive attach constants.
pub mod attach {
    /// Detach escape sequence recognized in TTY sessions: Ctrl-P Ctrl-Q.
    ///
    /// Typing it into an attached terminal ends the session without
    /// signalling the container process.
    pub const DETACH_SEQUENCE: &[u8] = &[0x10, 0x11];

    /// Relay copy buffer size in bytes.
    pub const COPY_BUFFER: usize = 8 * 1024;
}

/// Log storage constants.
pub mod logs {
    /// File name of the structured record log, one JSON record per line.
    pub const RECORD_FILE: &str = "records.log";

    /// File name prefix for the legacy raw per-direction stores
    /// (`raw-stdout.log`, `raw-stderr.log`).
    pub const LEGACY_PREFIX: &str = "raw";
}
