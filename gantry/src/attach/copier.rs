//! Byte relays between client endpoints and process pipes.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use gantry_shared::constants::attach::COPY_BUFFER;

/// Copy `source` into `sink` until the source is exhausted.
///
/// With `escape` set (TTY sessions) the stream is additionally scanned
/// for the detach sequence; recognizing it ends the relay without error
/// and without forwarding the sequence or anything after it.
pub(crate) async fn relay_bytes<R, W>(
    source: &mut R,
    sink: &mut W,
    escape: Option<&[u8]>,
) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match escape {
        Some(sequence) => copy_with_detach(source, sink, sequence).await,
        None => tokio::io::copy(source, sink).await,
    }
}

/// Copy `source` into `sink`, stopping early when `escape` appears in the
/// stream.
///
/// Bytes of a partial match are held back until the match either
/// completes or falls apart; a partial match still held at end of stream
/// is flushed, so marker-free input is forwarded byte-for-byte.
async fn copy_with_detach<R, W>(source: &mut R, sink: &mut W, escape: &[u8]) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    debug_assert!(!escape.is_empty());

    let mut buf = [0u8; COPY_BUFFER];
    let mut out = Vec::with_capacity(COPY_BUFFER);
    let mut matched = 0;
    let mut written = 0u64;

    loop {
        let n = source.read(&mut buf).await?;
        if n == 0 {
            if matched > 0 {
                sink.write_all(&escape[..matched]).await?;
                written += matched as u64;
            }
            sink.flush().await?;
            return Ok(written);
        }

        out.clear();
        let mut detached = false;
        for &byte in &buf[..n] {
            matched = advance_match(escape, matched, byte, &mut out);
            if matched == escape.len() {
                detached = true;
                break;
            }
        }

        if !out.is_empty() {
            sink.write_all(&out).await?;
            written += out.len() as u64;
        }
        if detached {
            sink.flush().await?;
            return Ok(written);
        }
    }
}

/// Feed one byte to the incremental sequence matcher.
///
/// Returns the new match length; bytes that can no longer be part of a
/// match are appended to `out` for forwarding.
fn advance_match(escape: &[u8], matched: usize, byte: u8, out: &mut Vec<u8>) -> usize {
    if byte == escape[matched] {
        return matched + 1;
    }

    // The held prefix plus this byte no longer matches. Emit the shortest
    // leading slice such that what remains is again a prefix of the
    // sequence (the empty suffix always qualifies).
    let mut held = Vec::with_capacity(matched + 1);
    held.extend_from_slice(&escape[..matched]);
    held.push(byte);
    for start in 1..=held.len() {
        if escape.starts_with(&held[start..]) {
            out.extend_from_slice(&held[..start]);
            return held.len() - start;
        }
    }
    unreachable!("empty suffix is a prefix of every sequence")
}

/// Normalize the closed-pipe condition to success.
///
/// A peer end closing while a relay copies is the expected shape of
/// session teardown, not a fault; only other I/O errors are real.
pub(crate) fn suppress_closed_pipe(result: io::Result<u64>) -> io::Result<u64> {
    match result {
        Err(e) if is_closed_pipe(&e) => Ok(0),
        other => other,
    }
}

fn is_closed_pipe(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
    )
}
