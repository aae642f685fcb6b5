pub mod streaming;

pub use streaming::{
    LocalFsStore, ProgressEvent, ProgressSink, Singer, StreamConfig, StreamError, StreamService,
    STATISTICS_UNAVAILABLE,
};
