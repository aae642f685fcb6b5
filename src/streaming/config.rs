//! Configuration for the Record Pipeline
//!
//! Loaded from defaults, a TOML document, or environment variables:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | RECORD_STREAM_ITEM_DELAY_MS | 1500 | Simulated latency before each record write |
//! | RECORD_STREAM_CHUNK_SIZE | 16384 | Read size when draining a source |
//! | RECORD_STREAM_DATA_DIR | . | Base directory for stored files |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_ITEM_DELAY_MS: u64 = 1500;
const DEFAULT_READ_CHUNK_SIZE: usize = 16 * 1024;
const DEFAULT_DATA_DIR: &str = ".";

/// Invalid or unreadable configuration
#[derive(Debug)]
pub enum ConfigError {
    /// TOML could not be parsed
    Parse(String),
    /// A field holds a value the pipeline cannot run with
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Simulated I/O latency before each record is written
    #[serde(with = "duration_millis")]
    pub item_delay: Duration,
    /// Chunk size when draining a source (default: 16KB)
    pub read_chunk_size: usize,
    /// Base directory for the local record store
    pub data_dir: PathBuf,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            item_delay: Duration::from_millis(DEFAULT_ITEM_DELAY_MS),
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl StreamConfig {
    /// Configuration for tests (no delay, small chunks)
    pub fn test() -> Self {
        StreamConfig {
            item_delay: Duration::ZERO,
            read_chunk_size: 8,
            data_dir: std::env::temp_dir(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to defaults.
    pub fn from_env() -> Self {
        let defaults = StreamConfig::default();
        StreamConfig {
            item_delay: std::env::var("RECORD_STREAM_ITEM_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.item_delay),
            read_chunk_size: std::env::var("RECORD_STREAM_CHUNK_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|size| *size > 0)
                .unwrap_or(defaults.read_chunk_size),
            data_dir: std::env::var("RECORD_STREAM_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
        }
    }

    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: StreamConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.read_chunk_size == 0 {
            return Err(ConfigError::Invalid(
                "read_chunk_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Serde helper for Duration as milliseconds
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
