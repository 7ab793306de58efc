//! Encounter content model.
//!
//! Graphs of log nodes, their per-kind edges, value filters and operation
//! models, plus loading and versioning of authored encounter files.

pub mod application;
pub mod domain;
