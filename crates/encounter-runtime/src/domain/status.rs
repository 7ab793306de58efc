//! Walk status published to observers.

use encounter_content::domain::node::LogId;
use serde::Serialize;

/// Where a halted walk stands with its outstanding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestPhase {
    /// The request has been emitted and not yet picked up.
    Request,
    /// The content layer is presenting the request.
    Handle,
    /// The completion arrived; the handler is applying write-backs.
    PrepareComplete,
}

/// Lifecycle of one walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "phase", rename_all = "snake_case")]
pub enum WalkState {
    Idle,
    Walking,
    Halted(RequestPhase),
    Finished,
}

/// Snapshot of a walk, published on every transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkStatus {
    #[serde(flatten)]
    pub state: WalkState,
    /// The node being handled, or the last one handled once finished.
    pub current: Option<LogId>,
    /// Node activations so far.
    pub steps: usize,
}

impl WalkStatus {
    pub(crate) fn idle() -> Self {
        Self {
            state: WalkState::Idle,
            current: None,
            steps: 0,
        }
    }

    /// Returns `true` once the walk has ended, normally or not.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == WalkState::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_state_and_phase_inline() {
        let status = WalkStatus {
            state: WalkState::Halted(RequestPhase::PrepareComplete),
            current: Some(LogId::new("choice")),
            steps: 4,
        };

        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "state": "halted",
                "phase": "prepare_complete",
                "current": "choice",
                "steps": 4
            })
        );
        assert_eq!(
            serde_json::to_value(WalkStatus::idle()).unwrap()["state"],
            "idle"
        );
    }
}
