//! Byte sources for the copier
//!
//! A source is any tokio `AsyncRead` that can optionally say how many bytes
//! it will yield. In-memory buffers know; files opened without metadata and
//! pipes do not. Wrap a reader in [`KnownLength`] when the length comes from
//! elsewhere.

use std::io::{Cursor, Result as IoResult};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, BufReader, DuplexStream, ReadBuf};

/// Readable byte stream with an optional declared length
pub trait ByteSource: AsyncRead + Unpin + Send {
    /// Bytes this source will yield from its current position, if known
    fn declared_len(&self) -> Option<u64>;
}

impl<T> ByteSource for Cursor<T>
where
    T: AsRef<[u8]> + Unpin + Send,
{
    fn declared_len(&self) -> Option<u64> {
        let len = self.get_ref().as_ref().len() as u64;
        Some(len.saturating_sub(self.position()))
    }
}

impl ByteSource for &[u8] {
    fn declared_len(&self) -> Option<u64> {
        Some(self.len() as u64)
    }
}

impl ByteSource for tokio::fs::File {
    fn declared_len(&self) -> Option<u64> {
        None
    }
}

impl ByteSource for DuplexStream {
    fn declared_len(&self) -> Option<u64> {
        None
    }
}

impl<R: ByteSource> ByteSource for BufReader<R> {
    fn declared_len(&self) -> Option<u64> {
        // Bytes already pulled into the buffer are still pending for the caller
        self.get_ref()
            .declared_len()
            .map(|len| len + self.buffer().len() as u64)
    }
}

/// Attach an externally known length to a reader
#[derive(Debug)]
pub struct KnownLength<R> {
    inner: R,
    len: u64,
}

impl<R> KnownLength<R> {
    pub fn new(inner: R, len: u64) -> Self {
        KnownLength { inner, len }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl KnownLength<tokio::fs::File> {
    /// Open a file and take its length from metadata
    pub async fn open(path: impl AsRef<std::path::Path>) -> IoResult<Self> {
        let file = tokio::fs::File::open(path).await?;
        let len = file.metadata().await?.len();
        Ok(KnownLength::new(file, len))
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for KnownLength<R> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<IoResult<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl<R: AsyncRead + Unpin + Send> ByteSource for KnownLength<R> {
    fn declared_len(&self) -> Option<u64> {
        Some(self.len)
    }
}
