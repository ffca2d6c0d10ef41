//! Gantry attach/logs subsystem.
//!
//! Connects a remote client's input/output channels to a running
//! container process's standard streams, and replays previously captured
//! output on demand. The container lifecycle, image catalog, and request
//! transport live elsewhere in the engine; this crate consumes their
//! handles only.
//!
//! ## Architecture
//!
//! - `attach`: one relay task per stdio direction, detach-sequence
//!   recognition, outcome aggregation, deterministic teardown
//! - `container`: the collaborator surface (descriptor flags, take-once
//!   stream pipe endpoints, process-exit wait)
//! - `logs`: historical log storage handle and chronological replay
//! - `util`: tracing bootstrap for embedders

pub mod attach;
pub mod container;
pub mod logs;
pub mod util;

pub use attach::{AttachRequest, AttachSession, attach};
pub use container::{ByteSink, ByteSource, ContainerConfig, ContainerProcess, StreamPipes};
pub use gantry_shared::{Direction, GantryError, GantryResult, LogLayout, LogRecord};
pub use logs::LogStore;
