//! Value filter model.
//!
//! A filter is an ordered conjunction of typed comparisons. The result of an
//! empty filter is not part of the model: each call site declares its own
//! default.

use encounter_core::address::KeyValueAddress;
use serde::{Deserialize, Serialize};

/// How two operands are compared.
///
/// Ordering comparators apply to numbers only; `Contains`, `StartsWith` and
/// `EndsWith` apply to strings only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Contains,
    StartsWith,
    EndsWith,
    /// Any comparator this engine does not know.
    #[serde(other)]
    Unknown,
}

/// One typed comparison `lhs <comparator> rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterEntry {
    Boolean {
        lhs: KeyValueAddress<bool>,
        comparator: Comparator,
        rhs: KeyValueAddress<bool>,
    },
    Integer {
        lhs: KeyValueAddress<i64>,
        comparator: Comparator,
        rhs: KeyValueAddress<i64>,
    },
    Float {
        lhs: KeyValueAddress<f64>,
        comparator: Comparator,
        rhs: KeyValueAddress<f64>,
    },
    String {
        lhs: KeyValueAddress<String>,
        comparator: Comparator,
        rhs: KeyValueAddress<String>,
    },
    /// An entry of a type this engine does not know.
    #[serde(other)]
    Unknown,
}

/// An ordered list of comparisons, all of which must hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueFilterModel {
    /// The comparisons, evaluated in order.
    pub entries: Vec<FilterEntry>,
}

impl ValueFilterModel {
    /// A filter with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a filter from entries.
    #[must_use]
    pub fn new(entries: Vec<FilterEntry>) -> Self {
        Self { entries }
    }

    /// Returns `true` if the filter has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
