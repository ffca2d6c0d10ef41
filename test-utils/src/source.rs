//! Byte sources for attach tests.

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

/// Source that yields scripted chunks, one per read call, then EOF.
///
/// Chunk boundaries are preserved, which makes split-marker scanning
/// deterministic to test.
pub struct ScriptedSource {
    chunks: VecDeque<Vec<u8>>,
}

impl ScriptedSource {
    pub fn new<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
        }
    }
}

impl AsyncRead for ScriptedSource {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        // An empty chunk would read as EOF; skip any.
        let mut chunk = loop {
            match self.chunks.pop_front() {
                Some(chunk) if chunk.is_empty() => continue,
                Some(chunk) => break chunk,
                None => return Poll::Ready(Ok(())), // EOF
            }
        };

        if chunk.len() > buf.remaining() {
            let rest = chunk.split_off(buf.remaining());
            self.chunks.push_front(rest);
        }
        buf.put_slice(&chunk);
        Poll::Ready(Ok(()))
    }
}

/// Source that never yields and never ends, like a client holding its
/// input open without typing.
pub struct PendingSource;

impl PendingSource {
    pub fn source() -> gantry::ByteSource {
        Box::new(PendingSource)
    }
}

impl AsyncRead for PendingSource {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Pending
    }
}
