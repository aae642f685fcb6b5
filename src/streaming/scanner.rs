//! Statistics Scanner
//!
//! Reads a stored record file back line by line and counts the records that
//! satisfy a predicate. Lines that fail to decode (wrong field count, bad
//! integers, invalid UTF-8) are skipped.

use crate::streaming::codec::{decode, LineRecord, LINE_TERMINATOR};
use crate::streaming::error::StreamError;
use crate::streaming::service::StreamService;
use crate::streaming::store::RecordStore;
use tokio::io::AsyncBufReadExt;
use tracing::{debug, error};

/// Returned by [`StreamService::statistics`] when the count could not be computed
///
/// This means "unknown", not "zero matches".
pub const STATISTICS_UNAVAILABLE: i64 = -1;

/// Byte order mark some editors put at the start of UTF-8 files
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Per-scan tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Records that decoded and matched the predicate
    pub matched: usize,
    /// Records that decoded
    pub decoded: usize,
    /// Lines discarded as malformed
    pub skipped: usize,
}

impl<S: RecordStore> StreamService<S> {
    /// Count records in `storage_name` for which `predicate` holds
    ///
    /// Never fails: I/O errors are logged and reported as
    /// [`STATISTICS_UNAVAILABLE`].
    pub async fn statistics<T, F>(&self, storage_name: &str, predicate: F) -> i64
    where
        T: LineRecord,
        F: Fn(&T) -> bool,
    {
        match self.try_statistics(storage_name, predicate).await {
            Ok(count) => i64::try_from(count).unwrap_or(i64::MAX),
            Err(e) => {
                error!(storage = storage_name, error = %e, "Statistics unavailable");
                STATISTICS_UNAVAILABLE
            }
        }
    }

    /// Count matching records, returning I/O failures to the caller
    pub async fn try_statistics<T, F>(
        &self,
        storage_name: &str,
        predicate: F,
    ) -> Result<usize, StreamError>
    where
        T: LineRecord,
        F: Fn(&T) -> bool,
    {
        self.scan(storage_name, predicate).await.map(|stats| stats.matched)
    }

    /// Full scan with decode and skip tallies
    pub async fn scan<T, F>(
        &self,
        storage_name: &str,
        predicate: F,
    ) -> Result<ScanStats, StreamError>
    where
        T: LineRecord,
        F: Fn(&T) -> bool,
    {
        let mut reader = self
            .store
            .open(storage_name)
            .await
            .map_err(|e| StreamError::for_storage(storage_name, e))?;

        let mut stats = ScanStats::default();
        let mut line = Vec::new();
        let mut line_number = 0usize;

        loop {
            line.clear();
            if reader.read_until(LINE_TERMINATOR as u8, &mut line).await? == 0 {
                break;
            }
            line_number += 1;

            let bytes = if line_number == 1 {
                line.strip_prefix(UTF8_BOM).unwrap_or(&line[..])
            } else {
                &line[..]
            };

            let record = match std::str::from_utf8(bytes) {
                Ok(text) => decode::<T>(text).map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };

            match record {
                Ok(record) => {
                    stats.decoded += 1;
                    if predicate(&record) {
                        stats.matched += 1;
                    }
                }
                Err(reason) => {
                    stats.skipped += 1;
                    debug!(
                        storage = storage_name,
                        line = line_number,
                        reason = %reason,
                        "Skipping malformed record"
                    );
                }
            }
        }

        debug!(
            storage = storage_name,
            matched = stats.matched,
            decoded = stats.decoded,
            skipped = stats.skipped,
            "Scan completed"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::config::StreamConfig;
    use crate::streaming::record::Singer;
    use crate::streaming::store::{InMemoryStore, LocalFsStore};

    fn service_with(name: &str, contents: &[u8]) -> StreamService<InMemoryStore> {
        let store = InMemoryStore::new();
        store.insert(name, contents);
        StreamService::new(store, StreamConfig::test())
    }

    #[tokio::test]
    async fn test_count_matching() {
        let service = service_with("output.txt", b"1;Alice;3\n2;Bob;0\n3;Cara;5\n");
        let count = service
            .statistics("output.txt", |s: &Singer| s.count > 0)
            .await;
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_malformed_line_skipped() {
        let service = service_with("output.txt", b"1;Alice;3\n2;Bob\n");

        let stats = service
            .scan("output.txt", |_: &Singer| true)
            .await
            .unwrap();
        assert_eq!(
            stats,
            ScanStats {
                matched: 1,
                decoded: 1,
                skipped: 1
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_skipped() {
        let service = service_with("output.txt", b"1;\xff\xfe;3\n2;Bob;4\n");

        let count = service
            .try_statistics("output.txt", |s: &Singer| s.count > 0)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_last_line_without_terminator() {
        let service = service_with("output.txt", b"1;Alice;3\r\n2;Bob;7");

        let count = service
            .statistics("output.txt", |s: &Singer| s.count > 0)
            .await;
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_leading_bom_is_ignored() {
        let service = service_with("output.txt", b"\xef\xbb\xbf1;Alice;3\n2;Bob;7\n");

        let stats = service
            .scan("output.txt", |s: &Singer| s.id == 1)
            .await
            .unwrap();
        assert_eq!(stats.matched, 1);
        assert_eq!(stats.skipped, 0);
    }

    #[tokio::test]
    async fn test_bom_after_first_line_is_malformed() {
        let service = service_with("output.txt", b"1;Alice;3\n\xef\xbb\xbf2;Bob;7\n");

        let stats = service
            .scan("output.txt", |_: &Singer| true)
            .await
            .unwrap();
        assert_eq!(stats.decoded, 1);
        assert_eq!(stats.skipped, 1);
    }

    #[tokio::test]
    async fn test_empty_storage_counts_zero() {
        let service = service_with("output.txt", b"");
        let count = service.statistics("output.txt", |_: &Singer| true).await;
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_missing_storage_returns_sentinel() {
        let service = StreamService::new(InMemoryStore::new(), StreamConfig::test());

        let count = service.statistics("missing.txt", |_: &Singer| true).await;
        assert_eq!(count, STATISTICS_UNAVAILABLE);

        let err = service
            .try_statistics("missing.txt", |_: &Singer| true)
            .await
            .unwrap_err();
        assert!(matches!(err, StreamError::NotFound(name) if name == "missing.txt"));
    }

    #[tokio::test]
    async fn test_unreadable_path_returns_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let service = StreamService::new(LocalFsStore::new(dir.path()), StreamConfig::test());
        // A directory cannot be read as a record file
        std::fs::create_dir(dir.path().join("not-a-file")).unwrap();

        let count = service.statistics("not-a-file", |_: &Singer| true).await;
        assert_eq!(count, STATISTICS_UNAVAILABLE);
    }
}
