//! Error types for pipeline stages

use std::fmt;
use std::io::{Error as IoError, ErrorKind};

/// Failure of a write, copy or statistics call
#[derive(Debug)]
pub enum StreamError {
    /// Named storage does not exist
    NotFound(String),
    /// Any other I/O failure on the sink, source or storage
    Io(IoError),
}

impl StreamError {
    /// Attach the storage name to a not-found error
    pub fn for_storage(name: &str, e: IoError) -> Self {
        match e.kind() {
            ErrorKind::NotFound => StreamError::NotFound(name.to_string()),
            _ => StreamError::Io(e),
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::NotFound(name) => write!(f, "Storage not found: {}", name),
            StreamError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::Io(e) => Some(e),
            StreamError::NotFound(_) => None,
        }
    }
}

impl From<IoError> for StreamError {
    fn from(e: IoError) -> Self {
        StreamError::Io(e)
    }
}
