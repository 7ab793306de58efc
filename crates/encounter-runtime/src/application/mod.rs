pub mod channel;
pub mod filter;
pub mod handlers;
pub mod operation;
pub mod runner;
pub mod trigger;
