//! In-memory local storage

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{StorageError, StorageResult};
use crate::traits::LocalStorage;

/// Process-local [`LocalStorage`] backed by a `HashMap`.
///
/// Nothing survives the process. Intended for tests and for hosts without a
/// persistent namespace.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the storage with entries.
    #[must_use]
    pub fn with_items<I, K, V>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            items: RwLock::new(
                items
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, HashMap<String, String>>> {
        self.items
            .read()
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, HashMap<String, String>>> {
        self.items
            .write()
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.write()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.write()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        self.write()?.clear();
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let mut keys: Vec<String> = self.read()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
