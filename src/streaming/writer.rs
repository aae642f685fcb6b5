//! Stream Writer
//!
//! Encodes records one at a time and appends them to a caller-owned sink.
//!
//! ```text
//! for each record:
//!     sleep(item_delay) → WriteStarted → encode → [lock] append [unlock] → WriteProgress
//! WriteCompleted
//! ```
//!
//! The sink is borrowed for the whole call and is neither rewound nor closed.

use crate::streaming::codec::{encode, LineRecord};
use crate::streaming::error::StreamError;
use crate::streaming::progress::{ProgressEvent, ProgressSink};
use crate::streaming::service::StreamService;
use crate::streaming::store::RecordStore;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Outcome of a write call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub records_written: usize,
    pub bytes_written: u64,
}

impl<S: RecordStore> StreamService<S> {
    /// Write `records` to `sink` in order, one encoded line each
    ///
    /// Any I/O failure aborts the call; records already appended stay in the
    /// sink.
    pub async fn write_to_stream<W, T, P>(
        &self,
        sink: &mut W,
        records: &[T],
        progress: &P,
    ) -> Result<WriteStats, StreamError>
    where
        W: AsyncWrite + Unpin + ?Sized,
        T: LineRecord,
        P: ProgressSink + ?Sized,
    {
        let total = records.len();
        let mut stats = WriteStats::default();

        if total == 0 {
            progress.report(&ProgressEvent::WriteCompleted { written: 0 });
            return Ok(stats);
        }

        debug!(total, "Writing records to stream");

        for (position, record) in records.iter().enumerate() {
            if !self.config.item_delay.is_zero() {
                tokio::time::sleep(self.config.item_delay).await;
            }

            let line = record.to_line();
            progress.report(&ProgressEvent::WriteStarted {
                index: position + 1,
                total,
                item: line,
            });

            let bytes = encode(record);
            {
                let _guard = self.io_lock.lock().await;
                sink.write_all(&bytes).await?;
                sink.flush().await?;
            }

            stats.records_written += 1;
            stats.bytes_written += bytes.len() as u64;
            progress.report(&ProgressEvent::WriteProgress {
                written: stats.records_written,
                total,
            });
        }

        progress.report(&ProgressEvent::WriteCompleted {
            written: stats.records_written,
        });
        info!(
            records = stats.records_written,
            bytes = stats.bytes_written,
            "Write to stream completed"
        );
        Ok(stats)
    }
}
