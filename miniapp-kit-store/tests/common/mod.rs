//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use miniapp_kit_storage::{AsyncKeyValueStore, StorageResult};
use serde::{Deserialize, Serialize};

/// Adapter that keeps every write in order, plus the current values.
#[derive(Default)]
pub struct RecordingStore {
    writes: Mutex<Vec<(String, String)>>,
    values: Mutex<std::collections::HashMap<String, String>>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn value(&self, key: &str) -> Option<serde_json::Value> {
        self.values
            .lock()
            .unwrap()
            .get(key)
            .map(|raw| serde_json::from_str(raw).unwrap())
    }
}

#[async_trait]
impl AsyncKeyValueStore for RecordingStore {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        // Yield so later writes would overtake this one if ordering were lost.
        tokio::task::yield_now().await;
        self.writes
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub token: String,
    pub nickname: String,
    pub visits: u32,
}

impl Profile {
    pub fn guest() -> Self {
        Self {
            token: String::new(),
            nickname: "guest".to_string(),
            visits: 0,
        }
    }
}
