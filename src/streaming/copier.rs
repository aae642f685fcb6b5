//! Stream Copier
//!
//! Drains a byte source into memory, then persists it to named storage.
//!
//! ```text
//! CopyStarted
//! Drain:   read(chunk) → accumulate → ReadProgress   (until EOF)
//! Persist: [lock] store.put(destination) → PersistProgress [unlock]
//! CopyCompleted
//! ```
//!
//! The accumulator is local to each call. The persist step takes the same
//! lock as the writer's appends.
//!
//! A failed `put` may leave a partially written file behind; nothing is
//! rolled back.

use crate::streaming::error::StreamError;
use crate::streaming::progress::{ProgressEvent, ProgressSink};
use crate::streaming::service::StreamService;
use crate::streaming::source::ByteSource;
use crate::streaming::store::RecordStore;
use bytes::{Bytes, BytesMut};
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info};

/// Upper bound on up-front allocation from a declared source length
const PREALLOCATE_BYTES_MAX: u64 = 64 * 1024 * 1024;

/// Outcome of a copy call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub bytes_copied: u64,
    pub chunks_read: usize,
}

impl<S: RecordStore> StreamService<S> {
    /// Copy everything `source` yields into the storage named `destination`
    ///
    /// The destination is created or truncated.
    pub async fn copy_from_stream<R, P>(
        &self,
        source: &mut R,
        destination: &str,
        progress: &P,
    ) -> Result<CopyStats, StreamError>
    where
        R: ByteSource + ?Sized,
        P: ProgressSink + ?Sized,
    {
        progress.report(&ProgressEvent::CopyStarted {
            destination: destination.to_string(),
        });

        let (data, chunks_read) = self.drain(source, progress).await?;
        self.persist(destination, &data, progress).await?;

        let stats = CopyStats {
            bytes_copied: data.len() as u64,
            chunks_read,
        };
        progress.report(&ProgressEvent::CopyCompleted {
            destination: destination.to_string(),
            bytes: stats.bytes_copied,
        });
        info!(
            destination,
            bytes = stats.bytes_copied,
            chunks = stats.chunks_read,
            "Copy from stream completed"
        );
        Ok(stats)
    }

    /// Read `source` to EOF in `read_chunk_size` pieces
    async fn drain<R, P>(
        &self,
        source: &mut R,
        progress: &P,
    ) -> Result<(Bytes, usize), StreamError>
    where
        R: ByteSource + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let total = source.declared_len();
        let chunk_size = self.config.read_chunk_size.max(1);
        let capacity = total
            .map(|len| len.min(PREALLOCATE_BYTES_MAX) as usize)
            .unwrap_or(chunk_size);

        let mut buffer = BytesMut::with_capacity(capacity);
        let mut chunk = vec![0u8; chunk_size];
        let mut chunks_read = 0;

        loop {
            let n = source.read(&mut chunk).await.map_err(|e| {
                error!(error = %e, bytes_read = buffer.len(), "Source read failed");
                StreamError::from(e)
            })?;
            if n == 0 {
                break;
            }

            buffer.extend_from_slice(&chunk[..n]);
            chunks_read += 1;
            progress.report(&ProgressEvent::ReadProgress {
                bytes_read: buffer.len() as u64,
                total,
            });
        }

        debug!(bytes = buffer.len(), chunks = chunks_read, ?total, "Source drained");
        Ok((buffer.freeze(), chunks_read))
    }

    /// Write the drained bytes to storage under the I/O lock
    async fn persist<P>(
        &self,
        destination: &str,
        data: &[u8],
        progress: &P,
    ) -> Result<(), StreamError>
    where
        P: ProgressSink + ?Sized,
    {
        let _guard = self.io_lock.lock().await;

        self.store.put(destination, data).await.map_err(|e| {
            error!(destination, error = %e, "Persist failed");
            StreamError::Io(e)
        })?;

        progress.report(&ProgressEvent::PersistProgress {
            destination: destination.to_string(),
            bytes_written: data.len() as u64,
        });
        Ok(())
    }
}
