//! Container process collaborator surface.
//!
//! The container lifecycle subsystem owns process creation, state
//! transitions, and reaping. The attach side only reads the descriptor
//! flags, borrows the stream pipes, and waits for exit, so this module
//! holds exactly that surface and nothing more.

mod streams;

pub use streams::{ByteSink, ByteSource, StreamPipes};

use std::time::Duration;

use tokio::sync::watch;

use gantry_shared::{GantryError, GantryResult};

/// Stdio flags of a container, immutable for the lifetime of an attach
/// call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerConfig {
    /// Keep the process's stdin pipe open so clients can attach input.
    pub open_stdin: bool,

    /// Close the process's stdin after the first attached client's input
    /// ends; it is not reopened.
    pub stdin_once: bool,

    /// The process runs behind a pseudo-terminal.
    pub tty: bool,
}

/// Handle to a scheduled container process.
///
/// Created by the lifecycle subsystem when it spawns the process; the
/// attach subsystem reads the flags, takes pipe endpoints for one session
/// at a time, and waits on exit. The reaper calls [`mark_exited`]
/// exactly once when the process is gone.
///
/// [`mark_exited`]: ContainerProcess::mark_exited
pub struct ContainerProcess {
    id: String,
    config: ContainerConfig,
    streams: StreamPipes,
    exit: watch::Sender<bool>,
}

impl ContainerProcess {
    /// Wrap a spawned process's attach surface.
    pub fn new(id: impl Into<String>, config: ContainerConfig, streams: StreamPipes) -> Self {
        let (exit, _) = watch::channel(false);
        Self {
            id: id.into(),
            config,
            streams,
            exit,
        }
    }

    /// Container identifier, as minted by the lifecycle subsystem.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Session-side stdio pipe endpoints.
    pub fn streams(&self) -> &StreamPipes {
        &self.streams
    }

    /// Record that the process has exited, waking every exit waiter.
    pub fn mark_exited(&self) {
        let _ = self.exit.send(true);
    }

    /// Wait until the process exits.
    ///
    /// With `timeout == None` the wait is unbounded; otherwise
    /// [`GantryError::Timeout`] is returned when the bound elapses first.
    pub async fn wait_for_exit(&self, timeout: Option<Duration>) -> GantryResult<()> {
        let mut rx = self.exit.subscribe();
        let exited = async move {
            rx.wait_for(|exited| *exited)
                .await
                .map(|_| ())
                .map_err(|_| GantryError::Internal("process exit channel closed".into()))
        };

        match timeout {
            None => exited.await,
            Some(bound) => match tokio::time::timeout(bound, exited).await {
                Ok(result) => result,
                Err(_) => Err(GantryError::Timeout(format!(
                    "container {} did not exit within {:?}",
                    self.id, bound
                ))),
            },
        }
    }
}
