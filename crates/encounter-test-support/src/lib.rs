//! Shared test doubles for the encounter engine.

mod clock;
mod rng;
mod store;

pub use clock::FixedClock;
pub use rng::{MockRng, SequenceRng};
pub use store::{FailingKeyValueStore, RecordingKeyValueStore, StoreCall};
