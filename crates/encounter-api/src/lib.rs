//! Encounter engine HTTP content layer.
//!
//! Serves the loaded encounter library, starts walks and lets clients
//! present and resolve the requests a walk halts on.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod walk;
