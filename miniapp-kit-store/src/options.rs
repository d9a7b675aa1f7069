//! Store persistence options

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::StoreResult;

/// Schema version written into every snapshot unless configured otherwise.
pub const DEFAULT_VERSION: u32 = 1;

/// Suffix appended to the store name to form its storage key.
pub const STORAGE_KEY_SUFFIX: &str = "_storage";

/// Which top-level keys of the state are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Lasting {
    /// Nothing is persisted.
    Disabled,
    /// The whole state is persisted.
    #[default]
    All,
    /// Everything except the listed top-level keys. An empty list persists
    /// the whole state.
    Except(Vec<String>),
}

impl Lasting {
    pub fn except<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self::Except(keys.into_iter().map(Into::into).collect())
    }
}

impl From<bool> for Lasting {
    fn from(enabled: bool) -> Self {
        if enabled { Self::All } else { Self::Disabled }
    }
}

impl From<Vec<String>> for Lasting {
    fn from(keys: Vec<String>) -> Self {
        Self::Except(keys)
    }
}

/// What a state change writes while persistence is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisabledPersistence {
    /// No write at all.
    #[default]
    SkipWrite,
    /// Write a snapshot with an empty state object.
    WriteEmpty,
}

/// Upgrades a persisted state written under an older schema version.
///
/// Receives the persisted state and the version it was written with.
pub type MigrateFn = Arc<dyn Fn(Value, u32) -> StoreResult<Value> + Send + Sync>;

/// Options for [`create_store`](crate::create_store).
#[derive(Clone)]
pub struct StoreOptions {
    pub name: String,
    pub lasting: Lasting,
    pub when_disabled: DisabledPersistence,
    pub version: u32,
    pub migrate: Option<MigrateFn>,
}

impl StoreOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lasting: Lasting::default(),
            when_disabled: DisabledPersistence::default(),
            version: DEFAULT_VERSION,
            migrate: None,
        }
    }

    #[must_use]
    pub fn lasting(mut self, lasting: impl Into<Lasting>) -> Self {
        self.lasting = lasting.into();
        self
    }

    #[must_use]
    pub fn when_disabled(mut self, mode: DisabledPersistence) -> Self {
        self.when_disabled = mode;
        self
    }

    #[must_use]
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn migrate<F>(mut self, migrate: F) -> Self
    where
        F: Fn(Value, u32) -> StoreResult<Value> + Send + Sync + 'static,
    {
        self.migrate = Some(Arc::new(migrate));
        self
    }

    /// `<name>_storage`
    pub fn storage_key(&self) -> String {
        format!("{}{STORAGE_KEY_SUFFIX}", self.name)
    }
}

impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("name", &self.name)
            .field("lasting", &self.lasting)
            .field("when_disabled", &self.when_disabled)
            .field("version", &self.version)
            .field("migrate", &self.migrate.is_some())
            .finish()
    }
}
