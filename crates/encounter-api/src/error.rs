//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use encounter_content::application::library::LoadError;
use encounter_core::error::EncounterError;
use encounter_core::store::StoreError;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Encounter content failed to load.
    #[error("content error: {0}")]
    Content(#[from] LoadError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// Errors returned by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("encounter not found: {0}")]
    EncounterNotFound(String),

    #[error("walk not found: {0}")]
    WalkNotFound(Uuid),

    #[error("walk {0} has no pending request")]
    NothingPending(Uuid),

    #[error("pending request is {expected}, got a {received} resolution")]
    ResolutionMismatch {
        expected: &'static str,
        received: &'static str,
    },

    #[error(transparent)]
    Invalid(#[from] EncounterError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            Self::EncounterNotFound(_) => (StatusCode::NOT_FOUND, "encounter_not_found"),
            Self::WalkNotFound(_) => (StatusCode::NOT_FOUND, "walk_not_found"),
            Self::NothingPending(_) => (StatusCode::CONFLICT, "nothing_pending"),
            Self::ResolutionMismatch { .. } => (StatusCode::BAD_REQUEST, "resolution_mismatch"),
            Self::Invalid(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            Self::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_error"),
        };

        let body = ErrorBody {
            error: error_code,
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
