//! Progress Reporting
//!
//! Stages announce what they are doing through a [`ProgressSink`]. Sinks are
//! called inline on whatever task emits the event, so they must return
//! quickly and must never take the service's I/O lock.
//!
//! Provided sinks:
//! - closures `Fn(&ProgressEvent)`
//! - `mpsc::UnboundedSender<ProgressEvent>` for message passing
//! - [`TracingProgress`] which logs each event
//! - [`NoProgress`] which drops everything
//! - [`RecordingProgress`] which keeps every event in memory

use parking_lot::Mutex;
use std::fmt;
use tokio::sync::mpsc;
use tracing::info;

/// Percentage of `done` over `total`, rounded to two decimal places
///
/// `None` when `total` is zero.
pub fn percent_of(done: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    let raw = done as f64 / total as f64 * 100.0;
    Some((raw * 100.0).round() / 100.0)
}

/// A single status update from a pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// About to write the item at 1-based `index`
    WriteStarted {
        index: usize,
        total: usize,
        item: String,
    },
    /// `written` of `total` items are in the sink
    WriteProgress { written: usize, total: usize },
    /// Every item has been written
    WriteCompleted { written: usize },
    /// Copy into `destination` is starting
    CopyStarted { destination: String },
    /// A chunk was drained from the source
    ReadProgress { bytes_read: u64, total: Option<u64> },
    /// The drained buffer is on disk
    PersistProgress {
        destination: String,
        bytes_written: u64,
    },
    /// Copy into `destination` finished
    CopyCompleted { destination: String, bytes: u64 },
}

impl ProgressEvent {
    /// Completion percentage carried by this event, if it has one
    pub fn percent(&self) -> Option<f64> {
        match self {
            ProgressEvent::WriteProgress { written, total } => {
                percent_of(*written as u64, *total as u64)
            }
            ProgressEvent::ReadProgress { bytes_read, total } => {
                total.and_then(|total| percent_of(*bytes_read, total))
            }
            // Single write of the whole buffer
            ProgressEvent::PersistProgress { .. } => Some(100.0),
            _ => None,
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::WriteStarted { index, total, item } => {
                write!(f, "Starting write of item {} ({}/{})", item, index, total)
            }
            ProgressEvent::WriteProgress { .. } => {
                write!(f, "Write progress: {:.2}%", self.percent().unwrap_or(0.0))
            }
            ProgressEvent::WriteCompleted { written } => {
                write!(f, "Write to stream completed ({} records)", written)
            }
            ProgressEvent::CopyStarted { destination } => {
                write!(f, "Starting copy from stream to {}", destination)
            }
            ProgressEvent::ReadProgress { bytes_read, .. } => match self.percent() {
                Some(percent) => write!(f, "Read progress: {:.2}% from stream", percent),
                None => write!(
                    f,
                    "Read progress: {} bytes from stream (total unknown)",
                    bytes_read
                ),
            },
            ProgressEvent::PersistProgress { destination, .. } => {
                write!(f, "File write progress: 100.00% ({})", destination)
            }
            ProgressEvent::CopyCompleted { destination, bytes } => {
                write!(
                    f,
                    "Copy from stream to {} completed ({} bytes)",
                    destination, bytes
                )
            }
        }
    }
}

/// Observer for pipeline progress
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn report(&self, event: &ProgressEvent) {
        self(event)
    }
}

impl ProgressSink for mpsc::UnboundedSender<ProgressEvent> {
    fn report(&self, event: &ProgressEvent) {
        // A dropped receiver just means nobody is listening anymore
        let _ = self.send(event.clone());
    }
}

/// Logs every event at `info`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, event: &ProgressEvent) {
        info!(percent = ?event.percent(), "{}", event);
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _event: &ProgressEvent) {}
}

/// Keeps a transcript of every event
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().clone()
    }

    /// Percentages carried by events matching `filter`, in order
    pub fn percents(&self, filter: impl Fn(&ProgressEvent) -> bool) -> Vec<Option<f64>> {
        self.events
            .lock()
            .iter()
            .filter(|event| filter(event))
            .map(ProgressEvent::percent)
            .collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn report(&self, event: &ProgressEvent) {
        self.events.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent_of(1, 3), Some(33.33));
        assert_eq!(percent_of(2, 3), Some(66.67));
        assert_eq!(percent_of(3, 3), Some(100.0));
        assert_eq!(percent_of(0, 0), None);
    }

    #[test]
    fn test_write_progress_display() {
        let event = ProgressEvent::WriteProgress {
            written: 1,
            total: 3,
        };
        assert_eq!(event.to_string(), "Write progress: 33.33%");
    }

    #[test]
    fn test_read_progress_unknown_total() {
        let event = ProgressEvent::ReadProgress {
            bytes_read: 512,
            total: None,
        };
        assert_eq!(event.percent(), None);
        assert_eq!(
            event.to_string(),
            "Read progress: 512 bytes from stream (total unknown)"
        );
    }

    #[test]
    fn test_read_progress_known_total() {
        let event = ProgressEvent::ReadProgress {
            bytes_read: 16,
            total: Some(64),
        };
        assert_eq!(event.percent(), Some(25.0));
        assert_eq!(event.to_string(), "Read progress: 25.00% from stream");
    }

    #[test]
    fn test_closure_sink() {
        let seen = Mutex::new(Vec::new());
        let sink = |event: &ProgressEvent| seen.lock().push(event.to_string());
        sink.report(&ProgressEvent::WriteCompleted { written: 2 });
        assert_eq!(
            *seen.lock(),
            vec!["Write to stream completed (2 records)".to_string()]
        );
    }

    #[tokio::test]
    async fn test_channel_sink() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.report(&ProgressEvent::CopyStarted {
            destination: "out.txt".to_string(),
        });
        drop(tx);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.to_string(), "Starting copy from stream to out.txt");
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_tracing_and_noop_sinks_accept_events() {
        let event = ProgressEvent::PersistProgress {
            destination: "out.txt".to_string(),
            bytes_written: 3,
        };
        TracingProgress.report(&event);
        NoProgress.report(&event);
        assert_eq!(event.percent(), Some(100.0));
        assert_eq!(event.to_string(), "File write progress: 100.00% (out.txt)");
    }

    #[test]
    fn test_recording_sink() {
        let recorder = RecordingProgress::new();
        recorder.report(&ProgressEvent::WriteProgress {
            written: 1,
            total: 2,
        });
        recorder.report(&ProgressEvent::WriteCompleted { written: 2 });

        assert_eq!(recorder.events().len(), 2);
        assert_eq!(
            recorder.percents(|e| matches!(e, ProgressEvent::WriteProgress { .. })),
            vec![Some(50.0)]
        );
    }

    #[test]
    fn test_channel_sink_without_receiver() {
        let (tx, rx) = mpsc::unbounded_channel::<ProgressEvent>();
        drop(rx);
        tx.report(&ProgressEvent::WriteCompleted { written: 0 });
    }
}
