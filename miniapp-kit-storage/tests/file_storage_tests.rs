#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for `FileStorage` persistence across reopen.

use std::sync::Arc;

use miniapp_kit_storage::{AsyncKeyValueStore, FileStorage, LocalStorage, LocalStorageAdapter};

fn temp_storage_path() -> (tempfile::TempDir, std::path::PathBuf) {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let path = tmp.path().join("local_storage.json");
    (tmp, path)
}

#[test]
fn values_survive_reopen() {
    let (_tmp, path) = temp_storage_path();

    {
        let storage = FileStorage::open(&path).unwrap();
        storage.set_item("token", "secret").unwrap();
        storage.set_item("user_storage", r#"{"state":{},"version":1}"#).unwrap();
    }

    let reopened = FileStorage::open(&path).unwrap();
    assert_eq!(reopened.get_item("token").unwrap().as_deref(), Some("secret"));
    assert_eq!(
        reopened.get_item("user_storage").unwrap().as_deref(),
        Some(r#"{"state":{},"version":1}"#)
    );
    assert_eq!(reopened.keys().unwrap(), vec!["token", "user_storage"]);
}

#[test]
fn remove_and_clear_are_persisted() {
    let (_tmp, path) = temp_storage_path();

    let storage = FileStorage::open(&path).unwrap();
    storage.set_item("a", "1").unwrap();
    storage.set_item("b", "2").unwrap();
    storage.remove_item("a").unwrap();

    let reopened = FileStorage::open(&path).unwrap();
    assert_eq!(reopened.get_item("a").unwrap(), None);
    assert_eq!(reopened.get_item("b").unwrap().as_deref(), Some("2"));

    reopened.clear().unwrap();
    let cleared = FileStorage::open(&path).unwrap();
    assert!(cleared.keys().unwrap().is_empty());
}

#[test]
fn file_contents_are_a_json_object() {
    let (_tmp, path) = temp_storage_path();

    let storage = FileStorage::open(&path).unwrap();
    storage.set_item("token", "t-1").unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json, serde_json::json!({ "token": "t-1" }));
}

#[tokio::test]
async fn async_adapter_writes_through_to_file() {
    let (_tmp, path) = temp_storage_path();

    let storage = Arc::new(FileStorage::open(&path).unwrap());
    let adapter = LocalStorageAdapter::new(Arc::clone(&storage));

    adapter.set_item("cart_storage", "{}").await.unwrap();
    drop(adapter);

    let reopened = FileStorage::open(&path).unwrap();
    assert_eq!(reopened.get_item("cart_storage").unwrap().as_deref(), Some("{}"));
}
