//! Record Storage Abstraction
//!
//! Named durable storage for encoded record files. The copier persists a
//! whole buffer with `put`; the scanner reads it back line by line through
//! `open`.
//!
//! Implementations:
//! - `LocalFsStore`: files under a base directory
//! - `InMemoryStore`: for unit tests

use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::io::{Cursor, Error as IoError, ErrorKind, Result as IoResult};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWriteExt, BufReader};

/// Buffered line reader over a stored object
pub type StoreReader = Pin<Box<dyn AsyncBufRead + Send>>;

/// Storage for named record files
pub trait RecordStore: Send + Sync + 'static {
    /// Write `data` under `name`, creating it or truncating what was there
    fn put<'a>(
        &'a self,
        name: &'a str,
        data: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = IoResult<()>> + Send + 'a>>;

    /// Open `name` for sequential reading
    fn open<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn Future<Output = IoResult<StoreReader>> + Send + 'a>>;
}

// ============================================================================
// InMemoryStore - For tests
// ============================================================================

/// In-memory record store
///
/// Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    data: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw contents of `name` (for testing)
    pub fn contents(&self, name: &str) -> Option<Vec<u8>> {
        self.data.read().get(name).cloned()
    }

    /// Store raw contents directly, bypassing the pipeline (for testing)
    pub fn insert(&self, name: &str, data: impl Into<Vec<u8>>) {
        self.data.write().insert(name.to_string(), data.into());
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl RecordStore for InMemoryStore {
    fn put<'a>(
        &'a self,
        name: &'a str,
        data: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = IoResult<()>> + Send + 'a>> {
        Box::pin(async move {
            self.data.write().insert(name.to_string(), data.to_vec());
            Ok(())
        })
    }

    fn open<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn Future<Output = IoResult<StoreReader>> + Send + 'a>> {
        Box::pin(async move {
            let data = self.contents(name).ok_or_else(|| {
                IoError::new(ErrorKind::NotFound, format!("Key not found: {}", name))
            })?;
            let reader: StoreReader = Box::pin(Cursor::new(data));
            Ok(reader)
        })
    }
}

// ============================================================================
// LocalFsStore - Files on disk
// ============================================================================

/// Record store backed by files under a base directory
#[derive(Debug, Clone)]
pub struct LocalFsStore {
    base_path: PathBuf,
}

impl LocalFsStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        LocalFsStore {
            base_path: base_path.into(),
        }
    }

    /// Full path for a storage name
    pub fn full_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    async fn ensure_parent(path: &Path) -> IoResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

impl RecordStore for LocalFsStore {
    fn put<'a>(
        &'a self,
        name: &'a str,
        data: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = IoResult<()>> + Send + 'a>> {
        Box::pin(async move {
            let path = self.full_path(name);
            Self::ensure_parent(&path).await?;
            // create() truncates, so a shorter payload never leaves old bytes behind
            let mut file = tokio::fs::File::create(&path).await?;
            file.write_all(data).await?;
            file.flush().await
        })
    }

    fn open<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn Future<Output = IoResult<StoreReader>> + Send + 'a>> {
        Box::pin(async move {
            let file = tokio::fs::File::open(self.full_path(name)).await?;
            let reader: StoreReader = Box::pin(BufReader::new(file));
            Ok(reader)
        })
    }
}
