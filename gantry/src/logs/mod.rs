//! Historical log storage access.
//!
//! Captured container output lives in one of two on-disk shapes (see
//! `gantry_shared::layout`): the structured record log written by the
//! engine's log writer, or two raw per-direction byte stores for
//! containers predating it. This module only reads; the writer belongs
//! to the process supervisor.

mod replay;

pub use replay::replay;

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_stream::stream;
use futures::Stream;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use gantry_shared::{Direction, LogLayout, LogRecord};

/// Read handle over one container's captured logs.
pub struct LogStore {
    layout: LogLayout,
}

impl LogStore {
    /// Open a store over a container's log directory layout.
    pub fn new(layout: LogLayout) -> Self {
        Self { layout }
    }

    /// Open the structured record stream.
    ///
    /// Fails with `io::ErrorKind::NotFound` when the structured log was
    /// never created, the marker that this container predates structured
    /// storage and still uses the legacy stores.
    pub async fn open_records(&self) -> io::Result<RecordStream> {
        let file = fs::File::open(self.layout.record_log()).await?;
        Ok(RecordStream::new(file))
    }

    /// Open the legacy raw byte store for one output direction.
    pub async fn open_legacy(&self, direction: Direction) -> io::Result<fs::File> {
        fs::File::open(self.layout.legacy_log(direction)).await
    }
}

/// Decoded log records in captured order.
///
/// Ends at the first malformed record: a decode failure is yielded as an
/// `InvalidData` error and the stream stops, leaving whatever was already
/// consumed in place.
pub struct RecordStream {
    inner: Pin<Box<dyn Stream<Item = io::Result<LogRecord>> + Send>>,
}

impl RecordStream {
    fn new<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let stream = stream! {
            let mut lines = BufReader::new(reader).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        match LogRecord::from_line(&line) {
                            Ok(record) => yield Ok(record),
                            Err(e) => {
                                yield Err(io::Error::new(io::ErrorKind::InvalidData, e));
                                break;
                            }
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
        };

        Self {
            inner: Box::pin(stream),
        }
    }
}

impl Stream for RecordStream {
    type Item = io::Result<LogRecord>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
