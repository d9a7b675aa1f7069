//! Async adapter over synchronous local storage

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::StorageResult;
use crate::traits::{AsyncKeyValueStore, LocalStorage};

/// Lifts a [`LocalStorage`] into an [`AsyncKeyValueStore`].
///
/// Every call is logged with its key (and value, for writes). Failures of
/// the underlying synchronous call are returned unchanged. An empty stored
/// string reads back as `None`, matching the host platform where a missing
/// key reads as `""`.
pub struct LocalStorageAdapter<S: ?Sized> {
    storage: Arc<S>,
}

impl<S: LocalStorage + ?Sized> LocalStorageAdapter<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// The wrapped storage.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

impl<S: ?Sized> Clone for LocalStorageAdapter<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

#[async_trait]
impl<S: LocalStorage + ?Sized> AsyncKeyValueStore for LocalStorageAdapter<S> {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        log::debug!("storage[getItem]: {key} has been retrieved");
        let value = self.storage.get_item(key)?;
        Ok(value.filter(|v| !v.is_empty()))
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        log::debug!("storage[setItem]: {key} with value {value} has been saved");
        self.storage.set_item(key, value)
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        log::debug!("storage[removeItem]: {key} has been deleted");
        self.storage.remove_item(key)
    }
}
