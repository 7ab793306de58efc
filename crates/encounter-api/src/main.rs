//! Encounter engine API server entry point.

use std::net::SocketAddr;

use axum::Router;
use encounter_api::config::ApiConfig;
use encounter_api::error::AppError;
use encounter_api::routes;
use encounter_api::state::AppState;
use encounter_content::application::library::EncounterLibrary;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting encounter engine API server");

    let config = ApiConfig::from_env()?;
    let library = EncounterLibrary::load_dir(&config.content_dir)?;
    let app_state = AppState::new(library, config.runner, config.rng_seed)
        .with_walk_retention(config.walk_retention);
    if config.cors_origins.is_empty() {
        tracing::warn!("CORS_ORIGINS not set; allowing any origin");
    }

    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/encounters", routes::encounters::router())
        .nest("/api/v1/walks", routes::walks::router())
        .nest("/api/v1/store", routes::store::router())
        .layer(TraceLayer::new_for_http())
        .layer(config.cors_layer())
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
