//! Walk-time diagnostics.
//!
//! Content and store errors never abort a walk. Each one is recorded here,
//! logged, and the affected node degrades to its "no match" or "skip" path.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::clock::Clock;
use crate::error::EncounterError;

/// A recovered error, attributed to the node that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// The node being handled when the error occurred.
    pub node_id: Option<String>,
    /// What went wrong.
    pub error: EncounterError,
    /// When it was recorded.
    pub occurred_at: DateTime<Utc>,
}

/// Collects diagnostics for one walk.
pub struct Diagnostics {
    clock: Arc<dyn Clock>,
    current_node: Option<String>,
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collector stamped by `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            current_node: None,
            entries: Vec::new(),
        }
    }

    /// Attributes subsequent diagnostics to `node_id`.
    pub fn enter(&mut self, node_id: &str) {
        self.current_node = Some(node_id.to_owned());
    }

    /// Records and logs a recovered error.
    pub fn record(&mut self, error: EncounterError) {
        warn!(
            node_id = self.current_node.as_deref().unwrap_or("-"),
            error = %error,
            "recovered encounter error"
        );
        self.entries.push(Diagnostic {
            node_id: self.current_node.clone(),
            error,
            occurred_at: self.clock.now(),
        });
    }

    /// Returns the diagnostics recorded so far.
    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Consumes the collector, returning its diagnostics.
    #[must_use]
    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("current_node", &self.current_node)
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct StoppedClock(DateTime<Utc>);

    impl Clock for StoppedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[test]
    fn test_record_attributes_to_current_node_and_stamps_time() {
        // Arrange
        let fixed_now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let mut diagnostics = Diagnostics::new(Arc::new(StoppedClock(fixed_now)));
        diagnostics.enter("log-7");

        // Act
        diagnostics.record(EncounterError::InvalidAddress);

        // Assert
        let entries = diagnostics.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].node_id.as_deref(), Some("log-7"));
        assert_eq!(entries[0].error, EncounterError::InvalidAddress);
        assert_eq!(entries[0].occurred_at, fixed_now);
    }
}
