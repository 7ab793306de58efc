//! Routes for inspecting and seeding the key-value store.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::delete, routing::get, routing::put};
use encounter_core::store::{KeyValueStore, Scope, StoreValue};
use encounter_store::StoreEntry;
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for DELETE /{scope}.
#[derive(Debug, Serialize)]
pub struct ClearScopeResponse {
    /// Number of entries removed.
    pub removed: usize,
}

/// GET /
async fn list_entries(State(state): State<AppState>) -> Result<Json<Vec<StoreEntry>>, ApiError> {
    Ok(Json(state.store.snapshot()?))
}

/// PUT /{scope}/{key}
#[instrument(skip(state, value))]
async fn put_value(
    State(state): State<AppState>,
    Path((scope, key)): Path<(String, String)>,
    Json(value): Json<StoreValue>,
) -> Result<StatusCode, ApiError> {
    let scope: Scope = scope.parse()?;
    state.store.set(&scope, &key, value).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /{scope}
#[instrument(skip(state))]
async fn clear_scope(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> Result<Json<ClearScopeResponse>, ApiError> {
    let scope: Scope = scope.parse()?;
    let removed = state.store.clear_scope(&scope)?;
    info!(removed, "store scope cleared");
    Ok(Json(ClearScopeResponse { removed }))
}

/// Returns the router for the store.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_entries))
        .route("/{scope}", delete(clear_scope))
        .route("/{scope}/{key}", put(put_value))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::Request;
    use encounter_content::application::library::EncounterLibrary;
    use encounter_runtime::RunnerConfig;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_app_state() -> AppState {
        AppState::new(EncounterLibrary::new(), RunnerConfig::default(), None)
    }

    fn put_request(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_put_then_list_returns_typed_entries() {
        // Arrange
        let state = test_app_state();
        let app = router().with_state(state.clone());

        // Act
        let response = app
            .clone()
            .oneshot(put_request(
                "/global/credits",
                &json!({ "type": "integer", "value": 250 }),
            ))
            .await
            .unwrap();
        let listed = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let body_bytes = axum::body::to_bytes(listed.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(
            json,
            json!([{
                "scope": "global",
                "key": "credits",
                "value": { "type": "integer", "value": 250 }
            }])
        );
        assert_eq!(
            state.store.get(&Scope::Global, "credits").await,
            Ok(StoreValue::Integer(250))
        );
    }

    #[tokio::test]
    async fn test_put_with_unknown_scope_returns_400() {
        let app = router().with_state(test_app_state());

        let response = app
            .oneshot(put_request(
                "/galaxy/credits",
                &json!({ "type": "integer", "value": 1 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_clears_only_named_scope() {
        // Arrange
        let state = test_app_state();
        state
            .store
            .set(&Scope::Encounter, "board.auto_used", StoreValue::Boolean(true))
            .await
            .unwrap();
        state
            .store
            .set(&Scope::Global, "credits", StoreValue::Integer(5))
            .await
            .unwrap();
        let app = router().with_state(state.clone());

        // Act
        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/encounter")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // Assert
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(json["removed"], 1);
        assert_eq!(state.store.snapshot().unwrap().len(), 1);
    }
}
