//! Server configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use axum::http::HeaderValue;
use encounter_runtime::RunnerConfig;
use encounter_runtime::application::runner::DEFAULT_MAX_STEPS;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::error::AppError;

/// How long a finished walk stays queryable before it is evicted.
pub const DEFAULT_WALK_RETENTION: Duration = Duration::from_secs(300);

/// Settings for one server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Directory of encounter files.
    pub content_dir: PathBuf,
    pub host: String,
    pub port: u16,
    /// Walk limits applied to every walk.
    pub runner: RunnerConfig,
    /// Seed for reproducible walks; OS entropy when absent.
    pub rng_seed: Option<u64>,
    /// How long finished walks are kept.
    pub walk_retention: Duration,
    /// Allowed CORS origins; any origin when empty.
    pub cors_origins: Vec<HeaderValue>,
}

impl ApiConfig {
    /// Reads `CONTENT_DIR`, `HOST`, `PORT`, `MAX_STEPS`, `RNG_SEED`,
    /// `WALK_RETENTION_SECS` and `CORS_ORIGINS` (comma separated).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `CONTENT_DIR` is missing or a value does
    /// not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`ApiConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let content_dir = lookup("CONTENT_DIR")
            .map(PathBuf::from)
            .ok_or_else(|| AppError::Config("CONTENT_DIR environment variable must be set".into()))?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
        let max_steps = match lookup("MAX_STEPS") {
            None => Some(DEFAULT_MAX_STEPS),
            Some(raw) => match raw
                .parse::<usize>()
                .map_err(|e| AppError::Config(format!("MAX_STEPS must be a valid usize: {e}")))?
            {
                0 => None,
                n => Some(n),
            },
        };
        let rng_seed = lookup("RNG_SEED")
            .map(|raw| raw.parse::<u64>())
            .transpose()
            .map_err(|e| AppError::Config(format!("RNG_SEED must be a valid u64: {e}")))?;
        let walk_retention = match lookup("WALK_RETENTION_SECS") {
            None => DEFAULT_WALK_RETENTION,
            Some(raw) => raw.parse::<u64>().map(Duration::from_secs).map_err(|e| {
                AppError::Config(format!("WALK_RETENTION_SECS must be a valid u64: {e}"))
            })?,
        };
        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|e| {
                    AppError::Config(format!("CORS_ORIGINS entry {origin:?} is invalid: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            content_dir,
            host,
            port,
            runner: RunnerConfig { max_steps },
            rng_seed,
            walk_retention,
            cors_origins,
        })
    }

    /// Builds the CORS layer: permissive without configured origins,
    /// restricted to them otherwise.
    #[must_use]
    pub fn cors_layer(&self) -> CorsLayer {
        if self.cors_origins.is_empty() {
            return CorsLayer::permissive();
        }
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(self.cors_origins.clone()))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
