//! # miniapp-kit-store
//!
//! State store factory with selective, versioned persistence.
//!
//! Each store keeps its state in memory and mirrors a projection of it into
//! an [`AsyncKeyValueStore`](miniapp_kit_storage::AsyncKeyValueStore) under
//! `<name>_storage`, as `{"state": ..., "version": 1}`.
//!
//! | `lasting` | Persisted projection |
//! |-----------|----------------------|
//! | `Lasting::All` (default) | the whole state |
//! | `Lasting::Except(keys)` | the state minus those top-level keys |
//! | `Lasting::Disabled` | nothing; see [`DisabledPersistence`] |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use miniapp_kit_storage::{LocalStorageAdapter, MemoryStorage};
//! use miniapp_kit_store::{Lasting, StoreOptions, create_store};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct Session {
//!     user: String,
//!     draft: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = Arc::new(LocalStorageAdapter::new(Arc::new(MemoryStorage::new())));
//!     let store = create_store(
//!         |_| Session { user: String::new(), draft: String::new() },
//!         StoreOptions::new("session").lasting(Lasting::except(["draft"])),
//!         storage,
//!     )
//!     .await?;
//!
//!     store.set_state(|s| Session { user: "ann".into(), ..s.clone() })?;
//!     store.flush().await?;
//!     Ok(())
//! }
//! ```

mod error;
mod options;
mod persist;
mod store;

#[cfg(test)]
mod test_utils;

pub use error::{StoreError, StoreResult};
pub use options::{
    DEFAULT_VERSION, DisabledPersistence, Lasting, MigrateFn, STORAGE_KEY_SUFFIX, StoreOptions,
};
pub use persist::{PersistedSnapshot, merge, partialize, snapshot_for};
pub use store::{Listener, Store, StoreApi, SubscriptionId, create_store};
