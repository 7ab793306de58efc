//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use encounter_content::application::library::EncounterLibrary;
use encounter_runtime::RunnerConfig;
use encounter_test_support::FixedClock;
use http_body_util::BodyExt;
use tower::ServiceExt;

use encounter_api::routes;
use encounter_api::state::AppState;

/// Seed shared by every walk started in integration tests.
pub const TEST_SEED: u64 = 2026;

/// Builds app state over the repository's `content/` directory with a fixed
/// clock and seeded walks.
pub fn test_app_state() -> AppState {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../content");
    let library = EncounterLibrary::load_dir(&dir).unwrap();
    AppState::new(library, RunnerConfig::default(), Some(TEST_SEED))
        .with_clock(Arc::new(FixedClock::epoch()))
}

/// Build the full app router. Uses the same route structure as `main.rs`.
pub fn build_test_app(app_state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/encounters", routes::encounters::router())
        .nest("/api/v1/walks", routes::walks::router())
        .nest("/api/v1/store", routes::store::router())
        .with_state(app_state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a request with a JSON body and return the response.
pub async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send_json(app, "POST", uri, body).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}
