//! Encounter Core — shared abstractions for the encounter engine.
//!
//! This crate defines the error model, the key-value store protocol and its
//! typed addressing, the determinism seams (clock, RNG), and the external
//! collaborators the engine writes to. It contains no infrastructure code.

pub mod address;
pub mod clock;
pub mod diagnostic;
pub mod encyclopedia;
pub mod error;
pub mod rng;
pub mod ship;
pub mod store;
