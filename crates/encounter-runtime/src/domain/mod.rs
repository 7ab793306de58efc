//! Domain layer: walk state and the content-layer request protocol.

pub mod continuation;
pub mod request;
pub mod status;
