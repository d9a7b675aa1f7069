//! Store factory
//!
//! A [`Store`] owns one state value behind a lock. Every change is projected
//! into a snapshot and queued on the store's writer; listeners are notified
//! after the lock is released.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
};
use std::thread::{self, ThreadId};

use miniapp_kit_storage::AsyncKeyValueStore;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{StoreError, StoreResult};
use crate::options::StoreOptions;
use crate::persist::{PersistedSnapshot, Writer, merge, snapshot_for, upgrade};

/// State change listener, called with `(new, previous)`.
pub type Listener<T> = Arc<dyn Fn(&T, &T) + Send + Sync>;

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct StoreInner<T> {
    state: RwLock<T>,
    /// Serializes commits; held while an updater runs.
    commit: Mutex<()>,
    /// Thread currently running an updater under `commit`.
    updating: Mutex<Option<ThreadId>>,
    listeners: Mutex<Vec<(SubscriptionId, Listener<T>)>>,
    next_listener: AtomicU64,
    hydrated: AtomicBool,
    options: StoreOptions,
    storage_key: String,
    storage: Arc<dyn AsyncKeyValueStore>,
    writer: Writer,
}

impl<T> StoreInner<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    fn read(&self) -> RwLockReadGuard<'_, T> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_commit(&self) -> MutexGuard<'_, ()> {
        self.commit.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn updating(&self) -> MutexGuard<'_, Option<ThreadId>> {
        self.updating.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `update` on a copy of the current state, then commit the result.
    ///
    /// The state lock is not held while `update` runs, so it may read the
    /// store. Calling `set_state` from inside `update` is rejected.
    fn set_state<F>(&self, update: F) -> StoreResult<()>
    where
        F: FnOnce(&T) -> T,
    {
        let me = thread::current().id();
        if *self.updating() == Some(me) {
            return Err(StoreError::Reentrant);
        }

        let (next, previous) = {
            let _commit = self.lock_commit();
            let current = self.read().clone();

            *self.updating() = Some(me);
            let next = {
                let _reset = UpdatingReset(&self.updating);
                update(&current)
            };

            let previous = std::mem::replace(&mut *self.write(), next.clone());
            // Queued under the commit lock so snapshots reach the writer in
            // commit order.
            self.persist(&next);
            (next, previous)
        };
        self.notify(&next, &previous);
        Ok(())
    }

    fn persist(&self, state: &T) {
        let value = match serde_json::to_value(state) {
            Ok(value) => value,
            Err(e) => {
                log::error!("Failed to serialize state of {}: {e}", self.storage_key);
                return;
            }
        };

        let Some(snapshot) = snapshot_for(&value, &self.options) else {
            return;
        };
        match snapshot.encode() {
            Ok(raw) => self.writer.write(raw),
            Err(e) => log::error!("Failed to encode snapshot of {}: {e}", self.storage_key),
        }
    }

    fn notify(&self, next: &T, previous: &T) {
        let listeners: Vec<Listener<T>> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(next, previous);
        }
    }

    async fn load(&self) -> StoreResult<bool> {
        let Some(raw) = self.storage.get_item(&self.storage_key).await? else {
            log::debug!("No persisted state under {}", self.storage_key);
            return Ok(false);
        };

        let snapshot = PersistedSnapshot::decode(&raw)?;
        let migrated = snapshot.version != self.options.version;
        let Some(persisted) = upgrade(snapshot, &self.options)? else {
            return Ok(false);
        };

        let (next, previous) = {
            let _commit = self.lock_commit();
            let mut state = self.write();
            let merged = merge(serde_json::to_value(&*state)?, persisted);
            let next: T = serde_json::from_value(merged)?;
            let previous = std::mem::replace(&mut *state, next.clone());
            if migrated {
                self.persist(&next);
            }
            (next, previous)
        };
        self.notify(&next, &previous);

        log::debug!("Hydrated {} from storage", self.storage_key);
        Ok(true)
    }
}

/// Clears the updating marker when the updater returns or unwinds.
struct UpdatingReset<'a>(&'a Mutex<Option<ThreadId>>);

impl Drop for UpdatingReset<'_> {
    fn drop(&mut self) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// A state container with persistence.
///
/// Cloning is cheap; clones share the same state.
pub struct Store<T> {
    inner: Arc<StoreInner<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("storage_key", &self.inner.storage_key)
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

impl<T> Store<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Current state.
    pub fn get_state(&self) -> T {
        self.inner.read().clone()
    }

    /// Derive the next state from the current one.
    ///
    /// The change is visible immediately; its snapshot is written in the
    /// background (see [`flush`](Self::flush)). `update` may read the store,
    /// but calling `set_state` from inside it fails with
    /// [`StoreError::Reentrant`].
    pub fn set_state<F>(&self, update: F) -> StoreResult<()>
    where
        F: FnOnce(&T) -> T,
    {
        self.inner.set_state(update)
    }

    pub fn replace_state(&self, state: T) -> StoreResult<()> {
        self.inner.set_state(|_| state)
    }

    /// Register a listener called after every change with `(new, previous)`.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_listener.fetch_add(1, Ordering::Relaxed));
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Set/get handle that does not keep the store alive.
    pub fn api(&self) -> StoreApi<T> {
        StoreApi {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Load the persisted snapshot again and merge it over the current state.
    ///
    /// Returns whether a snapshot was applied.
    pub async fn rehydrate(&self) -> StoreResult<bool> {
        self.inner.hydrated.store(false, Ordering::Release);
        let result = self.inner.load().await;
        self.inner.hydrated.store(true, Ordering::Release);
        result
    }

    /// Whether the last hydration has finished, successfully or not.
    pub fn has_hydrated(&self) -> bool {
        self.inner.hydrated.load(Ordering::Acquire)
    }

    /// Wait until every snapshot queued so far has been handed to storage.
    pub async fn flush(&self) -> StoreResult<()> {
        self.inner.writer.flush().await
    }

    /// Remove the persisted snapshot. The in-memory state is kept.
    pub async fn clear_storage(&self) -> StoreResult<()> {
        self.flush().await?;
        self.inner
            .storage
            .remove_item(&self.inner.storage_key)
            .await?;
        Ok(())
    }

    pub fn storage_key(&self) -> &str {
        &self.inner.storage_key
    }

    pub fn options(&self) -> &StoreOptions {
        &self.inner.options
    }
}

/// Set/get handle given to the store initializer.
///
/// Holds a weak reference: calls fail with [`StoreError::Detached`] while the
/// store is still being initialized and after it has been dropped.
pub struct StoreApi<T> {
    inner: Weak<StoreInner<T>>,
}

impl<T> Clone for StoreApi<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> StoreApi<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    fn upgrade(&self) -> StoreResult<Arc<StoreInner<T>>> {
        self.inner.upgrade().ok_or(StoreError::Detached)
    }

    pub fn get_state(&self) -> StoreResult<T> {
        Ok(self.upgrade()?.read().clone())
    }

    pub fn set_state<F>(&self, update: F) -> StoreResult<()>
    where
        F: FnOnce(&T) -> T,
    {
        self.upgrade()?.set_state(update)
    }
}

/// Create a persisted store.
///
/// `initializer` builds the initial state and receives the set/get handle,
/// which it may keep for later use. The snapshot stored under
/// `<name>_storage` is then merged over the initial state; failures while
/// doing so are logged and leave the initial state in place.
///
/// Must be awaited inside a tokio runtime: the store's writer is spawned on it.
pub async fn create_store<T, F>(
    initializer: F,
    options: StoreOptions,
    storage: Arc<dyn AsyncKeyValueStore>,
) -> StoreResult<Store<T>>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    F: FnOnce(&StoreApi<T>) -> T,
{
    let storage_key = options.storage_key();
    let writer = Writer::spawn(storage_key.clone(), Arc::clone(&storage));

    let inner = Arc::new_cyclic(|weak| {
        let api = StoreApi {
            inner: Weak::clone(weak),
        };
        StoreInner {
            state: RwLock::new(initializer(&api)),
            commit: Mutex::new(()),
            updating: Mutex::new(None),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(0),
            hydrated: AtomicBool::new(false),
            options,
            storage_key,
            storage,
            writer,
        }
    });
    let store = Store { inner };

    // Persistence needs a JSON representation of the state.
    serde_json::to_value(&*store.inner.read())?;

    if let Err(e) = store.rehydrate().await {
        log::warn!(
            "An error occurred during hydration of {}: {e}",
            store.storage_key()
        );
    }

    Ok(store)
}
