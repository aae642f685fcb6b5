//! Record Streaming Pipeline
//!
//! Moves typed records through byte streams into durable storage and back.
//!
//! ## Architecture
//!
//! ```text
//! [Singer] → write_to_stream → sink bytes → copy_from_stream → RecordStore
//!                                                                 ↓
//!                                        count ← statistics(predicate)
//! ```
//!
//! ## Key Features
//!
//! - **Line codec**: `id;name;count\n`, malformed lines skipped on read
//! - **Shared I/O lock**: sink appends and storage writes are serialized
//! - **Progress events**: per-item and per-chunk, via [`ProgressSink`]
//! - **Simulated latency**: configurable per-item delay

pub mod codec;
pub mod config;
pub mod copier;
pub mod error;
pub mod progress;
pub mod record;
pub mod scanner;
pub mod service;
pub mod source;
pub mod store;
pub mod writer;

pub use codec::{decode, encode, LineRecord, MalformedRecord};
pub use config::{ConfigError, StreamConfig};
pub use copier::CopyStats;
pub use error::StreamError;
pub use progress::{
    percent_of, NoProgress, ProgressEvent, ProgressSink, RecordingProgress, TracingProgress,
};
pub use record::Singer;
pub use scanner::{ScanStats, STATISTICS_UNAVAILABLE};
pub use service::StreamService;
pub use source::{ByteSource, KnownLength};
pub use store::{InMemoryStore, LocalFsStore, RecordStore, StoreReader};
pub use writer::WriteStats;
