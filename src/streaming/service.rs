//! Stream Service
//!
//! Owns the record store, the pipeline config and the I/O lock shared by the
//! writer and the copier. Clones share the same store and the same lock, so a
//! clone handed to another task still competes for the same critical section.
//!
//! The stages themselves live in `writer.rs`, `copier.rs` and `scanner.rs`.

use crate::streaming::config::StreamConfig;
use crate::streaming::store::{LocalFsStore, RecordStore};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Entry point for writing, copying and scanning record streams
pub struct StreamService<S: RecordStore> {
    pub(crate) store: Arc<S>,
    pub(crate) config: StreamConfig,
    /// Serializes sink appends and storage writes across concurrent calls
    pub(crate) io_lock: Arc<Mutex<()>>,
}

impl<S: RecordStore> StreamService<S> {
    pub fn new(store: S, config: StreamConfig) -> Self {
        StreamService {
            store: Arc::new(store),
            config,
            io_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }
}

impl StreamService<LocalFsStore> {
    /// Service storing files under `config.data_dir`
    pub fn local(config: StreamConfig) -> Self {
        let store = LocalFsStore::new(config.data_dir.clone());
        StreamService::new(store, config)
    }
}

impl<S: RecordStore> Clone for StreamService<S> {
    fn clone(&self) -> Self {
        StreamService {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            io_lock: Arc::clone(&self.io_lock),
        }
    }
}
