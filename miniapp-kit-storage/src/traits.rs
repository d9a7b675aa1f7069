//! Storage capability traits

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::StorageResult;

/// Synchronous host local storage.
///
/// Mirrors the platform's `getStorageSync` / `setStorageSync` /
/// `removeStorageSync` family. Implementations must be cheap to call from
/// async code; they are never awaited.
///
/// Implementations:
/// - [`MemoryStorage`](crate::MemoryStorage)
/// - [`FileStorage`](crate::FileStorage)
pub trait LocalStorage: Send + Sync {
    /// Read a value.
    ///
    /// # Returns
    /// * `Ok(Some(value))` - key present
    /// * `Ok(None)` - key absent
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> StorageResult<()>;

    /// Remove every key in the namespace.
    fn clear(&self) -> StorageResult<()>;

    /// List every key in the namespace.
    fn keys(&self) -> StorageResult<Vec<String>>;
}

impl<S: LocalStorage + ?Sized> LocalStorage for Arc<S> {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        (**self).remove_item(key)
    }

    fn clear(&self) -> StorageResult<()> {
        (**self).clear()
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        (**self).keys()
    }
}

/// Asynchronous key-value capability used by the persistence middleware.
///
/// Values are opaque strings; callers own the encoding.
#[async_trait]
pub trait AsyncKeyValueStore: Send + Sync {
    /// Read a value, `None` when absent.
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value.
    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a value.
    async fn remove_item(&self, key: &str) -> StorageResult<()>;
}
