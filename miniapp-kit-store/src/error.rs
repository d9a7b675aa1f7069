//! Store error type

use miniapp_kit_storage::StorageError;
use serde::Serialize;
use thiserror::Error;

/// Store layer error type
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum StoreError {
    /// The storage adapter failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// State or snapshot could not be converted to or from JSON
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A migration rejected the persisted state
    #[error("Migration from version {from} failed: {reason}")]
    Migration { from: u32, reason: String },

    /// The handle outlived its store, or was used before the store finished
    /// initializing
    #[error("Store is not available")]
    Detached,

    /// `set_state` was called from inside a state updater
    #[error("set_state called from inside a state updater")]
    Reentrant,

    /// The background writer is gone
    #[error("Persistence writer stopped")]
    WriterClosed,
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Store layer Result type alias
pub type StoreResult<T> = std::result::Result<T, StoreError>;
