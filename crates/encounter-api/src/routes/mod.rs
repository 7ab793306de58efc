//! Route modules.

pub mod encounters;
pub mod health;
pub mod store;
pub mod walks;
