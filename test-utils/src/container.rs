//! In-memory container process fixtures.

use tokio::io::{DuplexStream, duplex};

use gantry::{ContainerConfig, ContainerProcess, StreamPipes};

/// The process-side pipe ends of a fake container.
///
/// Read `stdin` to see what the attached client sent; write `stdout` and
/// `stderr` to emit process output. Dropping an end closes that pipe,
/// exactly like a real process exiting.
pub struct FakeProcess {
    pub stdin: DuplexStream,
    pub stdout: DuplexStream,
    pub stderr: DuplexStream,
}

/// Build an in-memory container process for attach tests.
///
/// All three stdio pipes are opened with the given buffer size; the
/// returned [`ContainerProcess`] holds the session-side ends, the
/// [`FakeProcess`] the process-side ends.
pub fn fake_container(
    id: &str,
    config: ContainerConfig,
    buffer: usize,
) -> (ContainerProcess, FakeProcess) {
    let (stdin_session, stdin_process) = duplex(buffer);
    let (stdout_process, stdout_session) = duplex(buffer);
    let (stderr_process, stderr_session) = duplex(buffer);

    let pipes = StreamPipes::new(
        Some(Box::new(stdin_session)),
        Some(Box::new(stdout_session)),
        Some(Box::new(stderr_session)),
    );

    (
        ContainerProcess::new(id, config, pipes),
        FakeProcess {
            stdin: stdin_process,
            stdout: stdout_process,
            stderr: stderr_process,
        },
    )
}
