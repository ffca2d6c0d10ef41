//! Integration tests for live attach sessions.

use std::time::Duration;

use anyhow::Result;
use gantry::{
    AttachRequest, AttachSession, ContainerConfig, ContainerProcess, GantryError, LogLayout,
    LogStore, StreamPipes, attach,
};
use gantry_test_utils::{CaptureSink, FailingSink, FakeProcess, PendingSource, ScriptedSource, fake_container};
use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};
use tokio::time::timeout;

/// Generous bound: anything that takes this long is blocked, not slow.
const TICK: Duration = Duration::from_secs(5);

// ============================================================================
// DRAIN / BACKPRESSURE
// ============================================================================

#[tokio::test]
async fn unrequested_outputs_never_block_the_process() -> Result<()> {
    let (container, mut process) = fake_container("c-drain", ContainerConfig::default(), 64);

    let writer = tokio::spawn(async move {
        // Far beyond the 64-byte pipe buffers; only completes if both
        // directions are being drained.
        let payload = vec![0x5Au8; 256 * 1024];
        process.stdout.write_all(&payload).await.unwrap();
        process.stderr.write_all(&payload).await.unwrap();
    });

    timeout(TICK, AttachSession::new(&container).run(None, None, None)).await??;
    writer.await?;
    Ok(())
}

// ============================================================================
// STDIN / OUTPUT COUPLING
// ============================================================================

#[tokio::test]
async fn stdin_once_non_tty_keeps_outputs_open_after_input_ends() -> Result<()> {
    let config = ContainerConfig {
        open_stdin: true,
        stdin_once: true,
        tty: false,
    };
    let (container, process) = fake_container("c-once", config, 1024);
    let FakeProcess {
        mut stdin,
        mut stdout,
        stderr,
    } = process;

    let stdout_cap = CaptureSink::new();
    let stderr_cap = CaptureSink::new();

    let proc_task = tokio::spawn(async move {
        // Consume the client's input until the stdin pipe closes.
        let mut input = Vec::new();
        stdin.read_to_end(&mut input).await.unwrap();
        assert_eq!(input, b"ls\n");

        // Stdin is gone, but the output pipes must still be open.
        stdout.write_all(b"a.txt\n").await.unwrap();
        drop(stdout);
        drop(stderr);
    });

    let session = AttachSession::new(&container);
    timeout(
        TICK,
        session.run(
            Some(Box::new(ScriptedSource::new([b"ls\n".to_vec()]))),
            Some(stdout_cap.sink()),
            Some(stderr_cap.sink()),
        ),
    )
    .await??;

    proc_task.await?;
    assert_eq!(stdout_cap.contents(), b"a.txt\n");
    assert!(stderr_cap.contents().is_empty());
    Ok(())
}

#[tokio::test]
async fn tty_stdin_hangup_tears_down_the_session() -> Result<()> {
    let config = ContainerConfig {
        open_stdin: true,
        stdin_once: false,
        tty: true,
    };
    let (container, process) = fake_container("c-tty", config, 1024);

    // Client input ends immediately; the process keeps every pipe open,
    // so only the stdin-hangup coupling can complete the session.
    let result = timeout(
        TICK,
        AttachSession::new(&container).run(
            Some(Box::new(tokio::io::empty())),
            Some(CaptureSink::new().sink()),
            None,
        ),
    )
    .await?;
    assert!(result.is_ok());

    drop(process);
    Ok(())
}

#[tokio::test]
async fn escape_sequence_detaches_without_error() -> Result<()> {
    let config = ContainerConfig {
        open_stdin: true,
        stdin_once: false,
        tty: true,
    };
    let (container, process) = fake_container("c-esc", config, 1024);
    let FakeProcess {
        mut stdin,
        stdout,
        stderr,
    } = process;

    let proc_task = tokio::spawn(async move {
        let mut input = Vec::new();
        stdin.read_to_end(&mut input).await.unwrap();
        // Nothing from the escape sequence onwards reaches the process.
        assert_eq!(input, b"abc");
        drop(stdout);
        drop(stderr);
    });

    timeout(
        TICK,
        AttachSession::new(&container).run(
            Some(Box::new(ScriptedSource::new([
                b"abc".to_vec(),
                vec![0x10, 0x11],
                b"zzz".to_vec(),
            ]))),
            None,
            None,
        ),
    )
    .await??;

    proc_task.await?;
    Ok(())
}

#[tokio::test]
async fn stdin_request_without_open_stdin_spawns_no_relay() -> Result<()> {
    let (container, process) = fake_container("c-closed", ContainerConfig::default(), 64);
    drop(process);

    // The pending client source never ends; the session must complete
    // without it because no stdin relay was spawned.
    timeout(
        TICK,
        AttachSession::new(&container).run(Some(PendingSource::source()), None, None),
    )
    .await??;

    // The stdin pipe sink was left untouched.
    assert!(container.streams().take_stdin().is_ok());
    Ok(())
}

// ============================================================================
// FAILURE PATHS
// ============================================================================

#[tokio::test]
async fn sink_failure_fails_the_session() -> Result<()> {
    let (container, mut process) = fake_container("c-fail", ContainerConfig::default(), 1024);

    let proc_task = tokio::spawn(async move {
        process.stdout.write_all(b"boom").await.unwrap();
    });

    let err = timeout(
        TICK,
        AttachSession::new(&container).run(None, Some(FailingSink::sink()), None),
    )
    .await?
    .unwrap_err();
    assert!(matches!(err, GantryError::Relay(_)));

    proc_task.await?;
    Ok(())
}

#[tokio::test]
async fn requested_stdin_without_a_pipe_fails() -> Result<()> {
    let (_stdout_process, stdout_session) = duplex(64);
    let (_stderr_process, stderr_session) = duplex(64);
    let pipes = StreamPipes::new(
        None,
        Some(Box::new(stdout_session)),
        Some(Box::new(stderr_session)),
    );
    let config = ContainerConfig {
        open_stdin: true,
        ..Default::default()
    };
    let container = ContainerProcess::new("c-nostdin", config, pipes);

    let err = timeout(
        TICK,
        AttachSession::new(&container).run(Some(PendingSource::source()), None, None),
    )
    .await?
    .unwrap_err();
    assert!(matches!(err, GantryError::StreamUnavailable(_)));
    Ok(())
}

#[tokio::test]
async fn a_direction_is_held_by_at_most_one_session() -> Result<()> {
    let (container, process) = fake_container("c-twice", ContainerConfig::default(), 64);
    drop(process);

    timeout(TICK, AttachSession::new(&container).run(None, None, None)).await??;

    // The first session consumed the endpoints; a client asking for
    // stdout now cannot get the direction back.
    let err = timeout(
        TICK,
        AttachSession::new(&container).run(None, Some(CaptureSink::new().sink()), None),
    )
    .await?
    .unwrap_err();
    assert!(matches!(err, GantryError::StreamUnavailable(_)));
    Ok(())
}

// ============================================================================
// ATTACH ENTRY POINT
// ============================================================================

#[tokio::test]
async fn attach_waits_for_exit_in_stdin_once_mode() -> Result<()> {
    let config = ContainerConfig {
        open_stdin: true,
        stdin_once: true,
        tty: false,
    };
    let (container, process) = fake_container("c-wait", config, 1024);
    drop(process); // every pipe closed: the stream session ends at once

    let dir = tempfile::tempdir()?;
    let store = LogStore::new(LogLayout::new(dir.path()));

    let request = AttachRequest {
        stream: true,
        stdin: Some(Box::new(tokio::io::empty())),
        ..Default::default()
    };
    let call = attach(&container, &store, request);
    tokio::pin!(call);

    // Relays are done, but the process has not exited: the call must
    // still be pending.
    assert!(
        timeout(Duration::from_millis(100), call.as_mut())
            .await
            .is_err()
    );

    container.mark_exited();
    timeout(TICK, call).await??;
    Ok(())
}
