//! Local-storage capabilities for miniapp-kit.
//!
//! The host platform exposes a synchronous key-value namespace ("local
//! storage"). This crate models it as the [`LocalStorage`] trait and lifts it
//! into the asynchronous [`AsyncKeyValueStore`] capability consumed by the
//! persisted store, through [`LocalStorageAdapter`].
//!
//! Backends:
//! - [`MemoryStorage`]: in-process map, used by tests and ephemeral hosts
//! - [`FileStorage`]: a single JSON object file, for native hosts
//!
//! Both components of miniapp-kit share one namespace: the request client
//! reads the `token` key, persisted stores write `<name>_storage` keys.

mod adapter;
mod error;
mod file;
mod memory;
mod traits;

pub use adapter::LocalStorageAdapter;
pub use error::{StorageError, StorageResult};
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use traits::{AsyncKeyValueStore, LocalStorage};
