//! 测试辅助模块

use std::sync::Arc;

use async_trait::async_trait;
use miniapp_kit_storage::{
    AsyncKeyValueStore, LocalStorageAdapter, MemoryStorage, StorageError, StorageResult,
};

/// In-memory backend plus the adapter a store would use over it.
pub fn memory_store() -> (Arc<MemoryStorage>, Arc<dyn AsyncKeyValueStore>) {
    let memory = Arc::new(MemoryStorage::new());
    let adapter = Arc::new(LocalStorageAdapter::new(Arc::clone(&memory)));
    (memory, adapter)
}

/// Adapter whose every call fails.
pub struct FailingStore;

#[async_trait]
impl AsyncKeyValueStore for FailingStore {
    async fn get_item(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::Unavailable("offline".to_string()))
    }

    async fn set_item(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("offline".to_string()))
    }

    async fn remove_item(&self, _key: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("offline".to_string()))
    }
}
