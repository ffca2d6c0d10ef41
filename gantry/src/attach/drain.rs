//! No-op drain for unrequested output directions.

use std::io;

use tokio::io::AsyncRead;

/// Consume and discard everything from `source` until it closes.
///
/// Spawned for stdout/stderr whenever the client did not request the
/// direction, so the process never stalls on a full, unread pipe buffer.
pub(crate) async fn drain<R>(source: &mut R) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
{
    tokio::io::copy(source, &mut tokio::io::sink()).await
}
