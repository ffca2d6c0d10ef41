//! Chronological replay of captured container output.

use std::io;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

use gantry_shared::Direction;

use super::{LogStore, RecordStream};
use crate::container::ByteSink;

/// Replay captured output to the requested sinks in capture order.
///
/// Best-effort by contract: storage problems are logged and swallowed so
/// the attach call proceeds regardless. Source selection:
/// - the structured record stream when it exists, interleaving directions
///   exactly as recorded and writing only requested ones;
/// - the legacy raw stores when the structured log was never created,
///   copied wholesale per requested direction;
/// - nothing at all when the structured log exists but cannot be opened.
pub async fn replay(
    store: &LogStore,
    stdout: Option<&mut ByteSink>,
    stderr: Option<&mut ByteSink>,
) {
    match store.open_records().await {
        Ok(records) => replay_records(records, stdout, stderr).await,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(target: "logs", "No structured log, replaying legacy stores");
            replay_legacy(store, stdout, stderr).await;
        }
        Err(e) => {
            error!(target: "logs", "Error opening structured log: {}", e);
        }
    }
}

async fn replay_records(
    mut records: RecordStream,
    mut stdout: Option<&mut ByteSink>,
    mut stderr: Option<&mut ByteSink>,
) {
    while let Some(item) = records.next().await {
        let record = match item {
            Ok(record) => record,
            Err(e) => {
                // Partial output already written stays; the rest of the
                // log is unreadable and there is nothing to fall back to.
                error!(target: "logs", "Error streaming log records: {}", e);
                break;
            }
        };

        let sink = match record.stream {
            Direction::Stdout => stdout.as_mut(),
            Direction::Stderr => stderr.as_mut(),
            Direction::Stdin => None,
        };
        if let Some(sink) = sink {
            if let Err(e) = sink.write_all(record.log.as_bytes()).await {
                error!(target: "logs", stream = %record.stream, "Error writing replayed records: {}", e);
                break;
            }
        }
    }
}

async fn replay_legacy(
    store: &LogStore,
    stdout: Option<&mut ByteSink>,
    stderr: Option<&mut ByteSink>,
) {
    // One store failing must not keep the other from being attempted.
    if let Some(sink) = stdout {
        copy_legacy(store, Direction::Stdout, sink).await;
    }
    if let Some(sink) = stderr {
        copy_legacy(store, Direction::Stderr, sink).await;
    }
}

async fn copy_legacy(store: &LogStore, direction: Direction, sink: &mut ByteSink) {
    match store.open_legacy(direction).await {
        Ok(mut file) => {
            if let Err(e) = tokio::io::copy(&mut file, sink).await {
                error!(target: "logs", stream = %direction, "Error streaming legacy log: {}", e);
            }
        }
        Err(e) => {
            error!(target: "logs", stream = %direction, "Error reading legacy log: {}", e);
        }
    }
}
