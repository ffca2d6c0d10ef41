//! Session-side stdio pipe endpoints.

use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncWrite};

use gantry_shared::{Direction, GantryError, GantryResult};

/// Session-side source of process output bytes.
pub type ByteSource = Box<dyn AsyncRead + Send + Unpin>;

/// Session-side sink for process input bytes.
pub type ByteSink = Box<dyn AsyncWrite + Send + Unpin>;

/// The session-side ends of a container process's stdio pipes.
///
/// The process supervisor wires the opposite ends into the process at
/// spawn time and hands this half to the attach subsystem. Each endpoint
/// can be taken exactly once: stdin by the stdin relay, stdout/stderr by
/// their relays or drains. Taking an endpoint that was never opened, or
/// that another session already holds, is a pre-condition failure.
pub struct StreamPipes {
    stdin: Mutex<Option<ByteSink>>,
    stdout: Mutex<Option<ByteSource>>,
    stderr: Mutex<Option<ByteSource>>,
}

impl StreamPipes {
    /// Wrap the endpoints the supervisor opened for this process.
    ///
    /// `None` means the process was started without that stream.
    pub fn new(
        stdin: Option<ByteSink>,
        stdout: Option<ByteSource>,
        stderr: Option<ByteSource>,
    ) -> Self {
        Self {
            stdin: Mutex::new(stdin),
            stdout: Mutex::new(stdout),
            stderr: Mutex::new(stderr),
        }
    }

    /// Take the stdin sink (can only be taken once).
    pub fn take_stdin(&self) -> GantryResult<ByteSink> {
        Self::take(&self.stdin, Direction::Stdin)
    }

    /// Take the stdout source (can only be taken once).
    pub fn take_stdout(&self) -> GantryResult<ByteSource> {
        Self::take(&self.stdout, Direction::Stdout)
    }

    /// Take the stderr source (can only be taken once).
    pub fn take_stderr(&self) -> GantryResult<ByteSource> {
        Self::take(&self.stderr, Direction::Stderr)
    }

    fn take<T>(slot: &Mutex<Option<T>>, direction: Direction) -> GantryResult<T> {
        slot.lock().take().ok_or_else(|| {
            GantryError::StreamUnavailable(format!(
                "{} pipe is not open or is already attached",
                direction
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_take_once() {
        let pipes = StreamPipes::new(None, Some(Box::new(tokio::io::empty())), None);

        assert!(pipes.take_stdout().is_ok());
        assert!(matches!(
            pipes.take_stdout(),
            Err(GantryError::StreamUnavailable(_))
        ));
        assert!(matches!(
            pipes.take_stdin(),
            Err(GantryError::StreamUnavailable(_))
        ));
    }
}
