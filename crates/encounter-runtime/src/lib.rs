//! Encounter engine runtime.
//!
//! Walks an `EncounterGraph` one node at a time: filters and operations are
//! evaluated against a `KeyValueStore`, presentation nodes are emitted as
//! `EncounterRequest`s, and halting nodes suspend the walk until the content
//! layer completes them.

pub mod application;
pub mod domain;

pub use application::runner::{EncounterServices, Runner, RunnerConfig, WalkReport};
pub use domain::request::EncounterRequest;
pub use domain::status::{WalkState, WalkStatus};
