//! Domain layer: the encounter graph model.

pub mod edge;
pub mod edges;
pub mod filter;
pub mod graph;
pub mod module;
pub mod node;
pub mod operation;
