//! Routes for the encounter library.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use encounter_core::diagnostic::Diagnostics;
use encounter_runtime::application::trigger::triggered_encounters;
use serde::Serialize;
use tracing::{info, instrument};

use crate::state::AppState;
use crate::walk::DiagnosticView;

/// One loaded encounter.
#[derive(Debug, Serialize)]
pub struct EncounterSummary {
    pub id: String,
    pub name: String,
    pub node_count: usize,
    /// SHA-256 of the source document.
    pub source_hash: String,
}

/// Response body for GET /triggered.
#[derive(Debug, Serialize)]
pub struct TriggeredResponse {
    /// Eligible encounters, in library order.
    pub encounter_ids: Vec<String>,
    /// Trigger evaluation errors.
    pub diagnostics: Vec<DiagnosticView>,
}

/// GET /
async fn list_encounters(State(state): State<AppState>) -> Json<Vec<EncounterSummary>> {
    let summaries = state
        .library
        .iter()
        .map(|entry| EncounterSummary {
            id: entry.graph.id().to_owned(),
            name: entry.graph.name().to_owned(),
            node_count: entry.graph.len(),
            source_hash: entry.source_hash.clone(),
        })
        .collect();
    Json(summaries)
}

/// GET /triggered
#[instrument(skip(state))]
async fn list_triggered(State(state): State<AppState>) -> Json<TriggeredResponse> {
    let mut diagnostics = Diagnostics::new(state.clock.clone());
    let eligible = triggered_encounters(&state.library, state.store.as_ref(), &mut diagnostics).await;
    let encounter_ids: Vec<String> = eligible.iter().map(|e| e.graph.id().to_owned()).collect();
    info!(eligible = encounter_ids.len(), "evaluated encounter triggers");

    Json(TriggeredResponse {
        encounter_ids,
        diagnostics: diagnostics
            .into_entries()
            .into_iter()
            .map(|d| DiagnosticView {
                node_id: d.node_id,
                message: d.error.to_string(),
                occurred_at: d.occurred_at,
            })
            .collect(),
    })
}

/// Returns the router for the encounter library.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_encounters))
        .route("/triggered", get(list_triggered))
}
