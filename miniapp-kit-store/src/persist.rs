//! Persistence middleware
//!
//! Projects state into a versioned snapshot, decodes snapshots back, and
//! owns the background writer that applies storage writes in order.

use std::sync::Arc;

use miniapp_kit_storage::AsyncKeyValueStore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::{mpsc, oneshot};

use crate::error::{StoreError, StoreResult};
use crate::options::{DisabledPersistence, Lasting, StoreOptions};

/// What lands in storage: `{"state": <projection>, "version": <n>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub state: Value,
    pub version: u32,
}

impl PersistedSnapshot {
    pub fn decode(raw: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn encode(&self) -> StoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Projection of `state` that is persisted under `lasting`.
///
/// Only top-level keys are filtered. `None` means persistence is disabled.
pub fn partialize(state: &Value, lasting: &Lasting) -> Option<Value> {
    match lasting {
        Lasting::Disabled => None,
        Lasting::All => Some(state.clone()),
        Lasting::Except(keys) => match state {
            Value::Object(map) if !keys.is_empty() => Some(Value::Object(
                map.iter()
                    .filter(|(key, _)| !keys.contains(key))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            )),
            other => Some(other.clone()),
        },
    }
}

/// Snapshot to write after a state change, if any.
pub fn snapshot_for(state: &Value, options: &StoreOptions) -> Option<PersistedSnapshot> {
    let projected = match partialize(state, &options.lasting) {
        Some(projected) => projected,
        None => match options.when_disabled {
            DisabledPersistence::SkipWrite => return None,
            DisabledPersistence::WriteEmpty => Value::Object(Map::new()),
        },
    };

    Some(PersistedSnapshot {
        state: projected,
        version: options.version,
    })
}

/// Shallow merge of a persisted state over the current one.
///
/// Persisted top-level keys win. A `null` persisted state keeps the current
/// one; a non-object persisted state replaces it.
pub fn merge(current: Value, persisted: Value) -> Value {
    match (current, persisted) {
        (Value::Object(mut current), Value::Object(persisted)) => {
            current.extend(persisted);
            Value::Object(current)
        }
        (current, Value::Null) => current,
        (_, persisted) => persisted,
    }
}

/// Bring a persisted snapshot up to the configured version.
///
/// `Ok(None)` means the snapshot is unusable and must be ignored.
pub fn upgrade(snapshot: PersistedSnapshot, options: &StoreOptions) -> StoreResult<Option<Value>> {
    if snapshot.version == options.version {
        return Ok(Some(snapshot.state));
    }

    match &options.migrate {
        Some(migrate) => migrate(snapshot.state, snapshot.version).map(Some),
        None => {
            log::warn!(
                "State loaded from storage couldn't be migrated since no migrate function was provided (key: {}, stored version: {}, expected: {})",
                options.storage_key(),
                snapshot.version,
                options.version
            );
            Ok(None)
        }
    }
}

enum WriteCommand {
    Write(String),
    Flush(oneshot::Sender<()>),
}

/// Sending half of a store's writer task.
///
/// Commands are applied strictly in the order they were queued. The task
/// exits once every `Writer` clone is dropped.
#[derive(Clone)]
pub(crate) struct Writer {
    tx: mpsc::UnboundedSender<WriteCommand>,
}

impl Writer {
    pub(crate) fn spawn(key: String, storage: Arc<dyn AsyncKeyValueStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(key, storage, rx));
        Self { tx }
    }

    pub(crate) fn write(&self, value: String) {
        if self.tx.send(WriteCommand::Write(value)).is_err() {
            log::warn!("Persistence writer stopped, dropping snapshot");
        }
    }

    pub(crate) async fn flush(&self) -> StoreResult<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(WriteCommand::Flush(done_tx))
            .map_err(|_| StoreError::WriterClosed)?;
        done_rx.await.map_err(|_| StoreError::WriterClosed)
    }
}

async fn run_writer(
    key: String,
    storage: Arc<dyn AsyncKeyValueStore>,
    mut rx: mpsc::UnboundedReceiver<WriteCommand>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            WriteCommand::Write(value) => {
                if let Err(e) = storage.set_item(&key, &value).await {
                    log::warn!("Failed to persist {key}: {e}");
                }
            }
            WriteCommand::Flush(done) => {
                // The flusher may have stopped waiting.
                done.send(()).ok();
            }
        }
    }
    log::debug!("Persistence writer for {key} stopped");
}
