//! Key-value store protocol.
//!
//! The store is the only shared mutable resource an encounter walk touches.
//! Values are typed, keyed by string, and partitioned into named scopes.
//! Implementations may complete inline (in-memory) or after real I/O; the
//! engine awaits either the same way.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::EncounterError;

/// A named partition of the store.
///
/// The set is open: content may address any `Custom` scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Save-wide game state.
    Global,
    /// Player preferences.
    Preferences,
    /// State local to encounters (button flags and the like).
    Encounter,
    /// Any other named scope.
    Custom(String),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Preferences => write!(f, "preferences"),
            Self::Encounter => write!(f, "encounter"),
            Self::Custom(name) => write!(f, "custom:{name}"),
        }
    }
}

impl FromStr for Scope {
    type Err = EncounterError;

    /// Parses the `Display` form back into a scope.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(Self::Global),
            "preferences" => Ok(Self::Preferences),
            "encounter" => Ok(Self::Encounter),
            _ => match s.strip_prefix("custom:") {
                Some(name) if !name.is_empty() => Ok(Self::Custom(name.to_owned())),
                _ => Err(EncounterError::unrecognized("scope", s)),
            },
        }
    }
}

/// The type tag of a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// `bool`
    Boolean,
    /// `i64`
    Integer,
    /// `f64`
    Float,
    /// `String`
    String,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
        };
        f.write_str(name)
    }
}

/// A dynamically typed store value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StoreValue {
    /// A boolean flag.
    Boolean(bool),
    /// A signed integer.
    Integer(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    String(String),
}

impl StoreValue {
    /// Returns the type tag of this value.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Boolean(_) => ValueType::Boolean,
            Self::Integer(_) => ValueType::Integer,
            Self::Float(_) => ValueType::Float,
            Self::String(_) => ValueType::String,
        }
    }
}

/// Rust types that can be stored in and read back from a `KeyValueStore`.
pub trait StoreType: Clone + fmt::Debug + Send + Sync + 'static {
    /// The store type tag for `Self`.
    const VALUE_TYPE: ValueType;

    /// Extracts `Self` from a store value of the matching type.
    fn from_value(value: StoreValue) -> Option<Self>;

    /// Wraps `self` into a store value.
    fn into_value(self) -> StoreValue;
}

impl StoreType for bool {
    const VALUE_TYPE: ValueType = ValueType::Boolean;

    fn from_value(value: StoreValue) -> Option<Self> {
        match value {
            StoreValue::Boolean(v) => Some(v),
            _ => None,
        }
    }

    fn into_value(self) -> StoreValue {
        StoreValue::Boolean(self)
    }
}

impl StoreType for i64 {
    const VALUE_TYPE: ValueType = ValueType::Integer;

    fn from_value(value: StoreValue) -> Option<Self> {
        match value {
            StoreValue::Integer(v) => Some(v),
            _ => None,
        }
    }

    fn into_value(self) -> StoreValue {
        StoreValue::Integer(self)
    }
}

impl StoreType for f64 {
    const VALUE_TYPE: ValueType = ValueType::Float;

    fn from_value(value: StoreValue) -> Option<Self> {
        match value {
            StoreValue::Float(v) => Some(v),
            _ => None,
        }
    }

    fn into_value(self) -> StoreValue {
        StoreValue::Float(self)
    }
}

impl StoreType for String {
    const VALUE_TYPE: ValueType = ValueType::String;

    fn from_value(value: StoreValue) -> Option<Self> {
        match value {
            StoreValue::String(v) => Some(v),
            _ => None,
        }
    }

    fn into_value(self) -> StoreValue {
        StoreValue::String(self)
    }
}

/// Errors reported by the store protocol.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// No value exists for the key in the scope.
    #[error("key not found: {scope}/{key}")]
    NotFound {
        /// The scope that was searched.
        scope: Scope,
        /// The missing key.
        key: String,
    },

    /// A value exists but has a different type than requested.
    #[error("type mismatch for {scope}/{key}: expected {expected}, found {found}")]
    TypeMismatch {
        /// The scope of the value.
        scope: Scope,
        /// The key of the value.
        key: String,
        /// The requested type.
        expected: ValueType,
        /// The stored type.
        found: ValueType,
    },

    /// The backend could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous get/set of typed values across named scopes.
///
/// The store is never locked by the engine. Two concurrent walks against the
/// same scope must be serialized by the caller.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key` in `scope`.
    async fn get(&self, scope: &Scope, key: &str) -> Result<StoreValue, StoreError>;

    /// Writes `value` under `key` in `scope`, replacing any previous value.
    async fn set(&self, scope: &Scope, key: &str, value: StoreValue) -> Result<(), StoreError>;
}

/// Reads a typed value from the store.
///
/// # Errors
///
/// Returns the store's error, or `StoreError::TypeMismatch` when the stored
/// value is not a `T`.
pub async fn get_typed<T: StoreType>(
    store: &dyn KeyValueStore,
    scope: &Scope,
    key: &str,
) -> Result<T, StoreError> {
    let value = store.get(scope, key).await?;
    let found = value.value_type();
    T::from_value(value).ok_or_else(|| StoreError::TypeMismatch {
        scope: scope.clone(),
        key: key.to_owned(),
        expected: T::VALUE_TYPE,
        found,
    })
}
