//! Application layer: loading authored encounters.

pub mod library;
