//! Routes for starting, inspecting and resolving walks.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post};
use encounter_runtime::Runner;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use crate::walk::{Resolution, SETTLE_TIMEOUT, WalkSession, WalkSnapshot};

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct StartWalkRequest {
    /// The encounter to walk.
    pub encounter_id: String,
}

/// POST /
///
/// Responds once the walk halts on a request or finishes.
#[instrument(skip(state, request), fields(encounter_id = %request.encounter_id))]
async fn start_walk(
    State(state): State<AppState>,
    Json(request): Json<StartWalkRequest>,
) -> Result<Json<WalkSnapshot>, ApiError> {
    let entry = state
        .library
        .get(&request.encounter_id)
        .ok_or_else(|| ApiError::EncounterNotFound(request.encounter_id.clone()))?;

    let walk_id = Uuid::new_v4();
    info!(%walk_id, "starting walk");
    let runner = Runner::new(Arc::clone(&entry.graph), state.services(), state.walk_rng())
        .with_config(state.runner);
    let session = WalkSession::start(walk_id, request.encounter_id, runner);
    state.insert_walk(Arc::clone(&session));

    session.settled(SETTLE_TIMEOUT).await;
    Ok(Json(session.present()))
}

/// GET /{walk_id}
async fn get_walk(
    State(state): State<AppState>,
    Path(walk_id): Path<Uuid>,
) -> Result<Json<WalkSnapshot>, ApiError> {
    let session = state.walk(walk_id).ok_or(ApiError::WalkNotFound(walk_id))?;
    Ok(Json(session.snapshot()))
}

/// POST /{walk_id}/resolve
///
/// Responds once the walk halts again or finishes.
#[instrument(skip(state, resolution))]
async fn resolve_walk(
    State(state): State<AppState>,
    Path(walk_id): Path<Uuid>,
    Json(resolution): Json<Resolution>,
) -> Result<Json<WalkSnapshot>, ApiError> {
    let session = state.walk(walk_id).ok_or(ApiError::WalkNotFound(walk_id))?;
    session.resolve(resolution)?;

    session.settled(SETTLE_TIMEOUT).await;
    Ok(Json(session.present()))
}

/// DELETE /{walk_id}
///
/// Stops the walk if it is still running and forgets it.
#[instrument(skip(state))]
async fn delete_walk(
    State(state): State<AppState>,
    Path(walk_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let session = state
        .remove_walk(walk_id)
        .ok_or(ApiError::WalkNotFound(walk_id))?;
    session.cancel();
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for walks.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_walk))
        .route("/{walk_id}", get(get_walk).delete(delete_walk))
        .route("/{walk_id}/resolve", post(resolve_walk))
}
