//! Test key-value stores.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use encounter_core::store::{KeyValueStore, Scope, StoreError, StoreValue};

/// One call observed by `RecordingKeyValueStore`.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Get { scope: Scope, key: String },
    Set { scope: Scope, key: String, value: StoreValue },
}

/// A map-backed store that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingKeyValueStore {
    values: Mutex<HashMap<(Scope, String), StoreValue>>,
    calls: Mutex<Vec<StoreCall>>,
}

impl RecordingKeyValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `values`. Seeding is not recorded.
    #[must_use]
    pub fn with_values<K: Into<String>>(
        values: impl IntoIterator<Item = (Scope, K, StoreValue)>,
    ) -> Self {
        let map = values
            .into_iter()
            .map(|(scope, key, value)| ((scope, key.into()), value))
            .collect();
        Self {
            values: Mutex::new(map),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns every call made so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns only the `set` calls, as `(scope, key, value)`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn writes(&self) -> Vec<(Scope, String, StoreValue)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Set { scope, key, value } => Some((scope, key, value)),
                StoreCall::Get { .. } => None,
            })
            .collect()
    }

    /// Returns the current value of `key` in `scope`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn value(&self, scope: &Scope, key: &str) -> Option<StoreValue> {
        self.values
            .lock()
            .unwrap()
            .get(&(scope.clone(), key.to_owned()))
            .cloned()
    }
}

#[async_trait]
impl KeyValueStore for RecordingKeyValueStore {
    async fn get(&self, scope: &Scope, key: &str) -> Result<StoreValue, StoreError> {
        self.calls.lock().unwrap().push(StoreCall::Get {
            scope: scope.clone(),
            key: key.to_owned(),
        });
        self.value(scope, key).ok_or_else(|| StoreError::NotFound {
            scope: scope.clone(),
            key: key.to_owned(),
        })
    }

    async fn set(&self, scope: &Scope, key: &str, value: StoreValue) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(StoreCall::Set {
            scope: scope.clone(),
            key: key.to_owned(),
            value: value.clone(),
        });
        self.values
            .lock()
            .unwrap()
            .insert((scope.clone(), key.to_owned()), value);
        Ok(())
    }
}

/// A store that rejects every call as unavailable.
#[derive(Debug, Default)]
pub struct FailingKeyValueStore;

#[async_trait]
impl KeyValueStore for FailingKeyValueStore {
    async fn get(&self, _scope: &Scope, _key: &str) -> Result<StoreValue, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn set(&self, _scope: &Scope, _key: &str, _value: StoreValue) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}
