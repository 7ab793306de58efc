//! In-memory backends for the encounter engine.
//!
//! The store, ship and encyclopedia live in process memory. Durable backends
//! implement the same `encounter-core` traits.

mod encyclopedia;
mod ship;
mod store;

pub use encyclopedia::MemoryEncyclopedia;
pub use ship::MemoryShipRepository;
pub use store::{MemoryKeyValueStore, StoreEntry};
