//! Test fixtures for the gantry attach/logs subsystem.
//!
//! In-memory stand-ins for the collaborators a live engine would provide:
//! scripted byte sources, capturing and failing sinks, and a fake
//! container process wired over duplex pipes.

mod container;
mod sink;
mod source;

pub use container::{FakeProcess, fake_container};
pub use sink::{CaptureSink, FailingSink};
pub use source::{PendingSource, ScriptedSource};
