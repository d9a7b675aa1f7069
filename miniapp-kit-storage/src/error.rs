//! Storage error type

use serde::Serialize;
use thiserror::Error;

/// Errors raised by local-storage backends and adapters.
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("Storage I/O error at {path}: {detail}")]
    Io { path: String, detail: String },

    /// Backing data could not be (de)serialized
    #[error("Storage serialization error: {0}")]
    Serialization(String),

    /// The backend cannot serve requests (poisoned lock, closed handle, ...)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub(crate) fn io(path: &std::path::Path, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            detail: err.to_string(),
        }
    }
}

/// Storage layer Result type alias
pub type StorageResult<T> = std::result::Result<T, StorageError>;
