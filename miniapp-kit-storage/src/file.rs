//! JSON file-backed local storage

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::{StorageError, StorageResult};
use crate::traits::LocalStorage;

/// [`LocalStorage`] persisted as one JSON object file.
///
/// The file is loaded once at [`open`](Self::open) and rewritten in full on
/// every mutation. The in-memory copy is the source of truth for reads.
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or create) the storage file at `path`.
    ///
    /// Missing parent directories are created. A missing or empty file
    /// starts an empty namespace; a file that is not a JSON string map is
    /// rejected.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, &e))?;
            }
        }

        let items = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::Serialization(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StorageError::io(&path, &e)),
        };

        log::info!(
            "Opened local storage {} ({} keys)",
            path.display(),
            items.len()
        );

        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, BTreeMap<String, String>>> {
        self.items
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }

    fn save(&self, items: &BTreeMap<String, String>) -> StorageResult<()> {
        let data =
            serde_json::to_vec_pretty(items).map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&self.path, data).map_err(|e| StorageError::io(&self.path, &e))
    }

    /// Apply a mutation and rewrite the file while still holding the lock,
    /// so file contents follow the order of mutations.
    ///
    /// The mutation runs on a copy that replaces the in-memory map only once
    /// the file has been written; a failed write leaves both untouched.
    fn mutate<F>(&self, f: F) -> StorageResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let mut items = self.lock()?;
        let mut next = items.clone();
        if f(&mut next) {
            self.save(&next)?;
            *items = next;
        }
        Ok(())
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.mutate(|items| {
            items.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.mutate(|items| items.remove(key).is_some())
    }

    fn clear(&self) -> StorageResult<()> {
        self.mutate(|items| {
            items.clear();
            true
        })
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}
