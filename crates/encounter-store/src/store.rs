//! In-memory `KeyValueStore`.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use encounter_core::store::{KeyValueStore, Scope, StoreError, StoreValue};
use serde::Serialize;
use tracing::trace;

/// One stored value, as listed by `MemoryKeyValueStore::snapshot`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreEntry {
    pub scope: Scope,
    pub key: String,
    pub value: StoreValue,
}

/// A process-local store keyed by `(scope, key)`.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: RwLock<HashMap<(Scope, String), StoreValue>>,
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("store lock poisoned".to_owned())
}

impl MemoryKeyValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `values`.
    #[must_use]
    pub fn with_values<K: Into<String>>(
        values: impl IntoIterator<Item = (Scope, K, StoreValue)>,
    ) -> Self {
        let map = values
            .into_iter()
            .map(|(scope, key, value)| ((scope, key.into()), value))
            .collect();
        Self {
            values: RwLock::new(map),
        }
    }

    /// Lists every stored value, sorted by scope name then key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the lock is poisoned.
    pub fn snapshot(&self) -> Result<Vec<StoreEntry>, StoreError> {
        let values = self.values.read().map_err(|_| poisoned())?;
        let mut entries: Vec<StoreEntry> = values
            .iter()
            .map(|((scope, key), value)| StoreEntry {
                scope: scope.clone(),
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        entries.sort_by(|a, b| {
            (a.scope.to_string(), &a.key).cmp(&(b.scope.to_string(), &b.key))
        });
        Ok(entries)
    }

    /// Removes every value in `scope`, e.g. encounter-local flags between runs.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the lock is poisoned.
    pub fn clear_scope(&self, scope: &Scope) -> Result<usize, StoreError> {
        let mut values = self.values.write().map_err(|_| poisoned())?;
        let before = values.len();
        values.retain(|(s, _), _| s != scope);
        Ok(before - values.len())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, scope: &Scope, key: &str) -> Result<StoreValue, StoreError> {
        let values = self.values.read().map_err(|_| poisoned())?;
        values
            .get(&(scope.clone(), key.to_owned()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                scope: scope.clone(),
                key: key.to_owned(),
            })
    }

    async fn set(&self, scope: &Scope, key: &str, value: StoreValue) -> Result<(), StoreError> {
        trace!(%scope, key, ?value, "store set");
        self.values
            .write()
            .map_err(|_| poisoned())?
            .insert((scope.clone(), key.to_owned()), value);
        Ok(())
    }
}
