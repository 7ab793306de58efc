//! Key-value addressing.
//!
//! A `KeyValueAddress<T>` is either an embedded literal or a reference into
//! the store. Operations and filters read their operands through addresses so
//! that content can mix constants and live state freely.

use serde::{Deserialize, Serialize};

use crate::error::EncounterError;
use crate::store::{KeyValueStore, Scope, StoreType, get_typed};

/// Where a typed value comes from, or goes to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum KeyValueAddress<T> {
    /// A literal embedded in the content.
    LocalValue {
        /// The literal.
        value: T,
    },
    /// A value held by the store.
    StoreReference {
        /// Scope of the referenced value.
        scope: Scope,
        /// Key of the referenced value.
        key: String,
    },
}

impl<T: StoreType> KeyValueAddress<T> {
    /// Creates a literal address.
    #[must_use]
    pub fn local(value: T) -> Self {
        Self::LocalValue { value }
    }

    /// Creates a store reference.
    #[must_use]
    pub fn reference(scope: Scope, key: impl Into<String>) -> Self {
        Self::StoreReference {
            scope,
            key: key.into(),
        }
    }

    /// Returns `true` if this address may be used as a write target.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        matches!(self, Self::StoreReference { .. })
    }

    /// Resolves the address to a value.
    ///
    /// Literals resolve immediately without touching the store.
    ///
    /// # Errors
    ///
    /// Returns `EncounterError::ResolutionFailure` if the store lookup fails or
    /// the stored value has the wrong type.
    pub async fn get(&self, store: &dyn KeyValueStore) -> Result<T, EncounterError> {
        match self {
            Self::LocalValue { value } => Ok(value.clone()),
            Self::StoreReference { scope, key } => Ok(get_typed(store, scope, key).await?),
        }
    }

    /// Writes `value` to the referenced store slot.
    ///
    /// # Errors
    ///
    /// Returns `EncounterError::InvalidAddress` without touching the store if
    /// the address is a literal, or `EncounterError::ResolutionFailure` if the
    /// store rejects the write.
    pub async fn set(&self, store: &dyn KeyValueStore, value: T) -> Result<(), EncounterError> {
        match self {
            Self::LocalValue { .. } => Err(EncounterError::InvalidAddress),
            Self::StoreReference { scope, key } => {
                store.set(scope, key, value.into_value()).await?;
                Ok(())
            }
        }
    }
}
