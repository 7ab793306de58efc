//! Domain error types.

use thiserror::Error;

use crate::store::StoreError;

/// Top-level error type for encounter content and execution.
///
/// Walk-time variants (`InvalidAddress`, `UnrecognizedKind`,
/// `ResolutionFailure`) are recovered locally by the runner and recorded as
/// diagnostics. `MalformedGraph` and `RunawayGraph` are returned to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncounterError {
    /// A write was attempted against a literal (`LocalValue`) address.
    #[error("invalid address: cannot write to a local value")]
    InvalidAddress,

    /// An unknown node, operation, comparator or target enumerant was met.
    #[error("unrecognized {category}: {value}")]
    UnrecognizedKind {
        /// What kind of enumerant was being interpreted.
        category: &'static str,
        /// The offending value, as far as it is known.
        value: String,
    },

    /// A get, set or filter resolution failed.
    #[error("resolution failure: {0}")]
    ResolutionFailure(String),

    /// Authored content violates a structural invariant.
    #[error("malformed graph: {0}")]
    MalformedGraph(String),

    /// A walk exceeded its configured step budget.
    #[error("runaway graph: exceeded {max_steps} steps")]
    RunawayGraph {
        /// The budget that was exhausted.
        max_steps: usize,
    },
}

impl EncounterError {
    /// Shorthand for an `UnrecognizedKind` error.
    #[must_use]
    pub fn unrecognized(category: &'static str, value: impl Into<String>) -> Self {
        Self::UnrecognizedKind {
            category,
            value: value.into(),
        }
    }
}

impl From<StoreError> for EncounterError {
    fn from(err: StoreError) -> Self {
        Self::ResolutionFailure(err.to_string())
    }
}
