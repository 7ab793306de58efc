//! Shared application state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use encounter_content::application::library::EncounterLibrary;
use encounter_core::clock::{Clock, SystemClock};
use encounter_core::rng::{DeterministicRng, SeededRng};
use encounter_runtime::{EncounterServices, RunnerConfig};
use encounter_store::{MemoryEncyclopedia, MemoryKeyValueStore, MemoryShipRepository};
use tracing::debug;
use uuid::Uuid;

use crate::config::DEFAULT_WALK_RETENTION;
use crate::walk::WalkSession;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Loaded encounters.
    pub library: Arc<EncounterLibrary>,
    /// The key-value store every walk reads and writes.
    pub store: Arc<MemoryKeyValueStore>,
    pub ship: Arc<MemoryShipRepository>,
    pub encyclopedia: Arc<MemoryEncyclopedia>,
    pub clock: Arc<dyn Clock>,
    /// Limits applied to every walk.
    pub runner: RunnerConfig,
    /// Seed for every walk's RNG; OS entropy when absent.
    pub rng_seed: Option<u64>,
    /// How long a finished walk stays registered.
    pub walk_retention: Duration,
    walks: Arc<Mutex<HashMap<Uuid, Arc<WalkSession>>>>,
}

impl AppState {
    /// Create new application state with empty in-memory backends.
    #[must_use]
    pub fn new(library: EncounterLibrary, runner: RunnerConfig, rng_seed: Option<u64>) -> Self {
        Self {
            library: Arc::new(library),
            store: Arc::new(MemoryKeyValueStore::new()),
            ship: Arc::new(MemoryShipRepository::default()),
            encyclopedia: Arc::new(MemoryEncyclopedia::new()),
            clock: Arc::new(SystemClock),
            runner,
            rng_seed,
            walk_retention: DEFAULT_WALK_RETENTION,
            walks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the retention of finished walks.
    #[must_use]
    pub fn with_walk_retention(mut self, retention: Duration) -> Self {
        self.walk_retention = retention;
        self
    }

    /// Collaborators handed to each new walk.
    #[must_use]
    pub fn services(&self) -> EncounterServices {
        EncounterServices {
            store: self.store.clone(),
            ship: self.ship.clone(),
            encyclopedia: self.encyclopedia.clone(),
            clock: Arc::clone(&self.clock),
        }
    }

    /// A fresh RNG for one walk.
    #[must_use]
    pub fn walk_rng(&self) -> Box<dyn DeterministicRng> {
        match self.rng_seed {
            Some(seed) => Box::new(SeededRng::new(seed)),
            None => Box::new(SeededRng::from_os_rng()),
        }
    }

    /// Registers a started walk and schedules its eviction once it has
    /// finished and `walk_retention` has passed.
    ///
    /// Must be called within a Tokio runtime.
    pub fn insert_walk(&self, session: Arc<WalkSession>) {
        let id = session.id();
        self.walks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::clone(&session));

        let state = self.clone();
        tokio::spawn(async move {
            session.finished().await;
            tokio::time::sleep(state.walk_retention).await;
            if state.remove_walk(id).is_some() {
                debug!(walk_id = %id, "finished walk evicted");
            }
        });
    }

    /// Unregisters a walk, returning it if it was registered.
    pub fn remove_walk(&self, id: Uuid) -> Option<Arc<WalkSession>> {
        self.walks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    /// Looks up a walk by id.
    #[must_use]
    pub fn walk(&self, id: Uuid) -> Option<Arc<WalkSession>> {
        self.walks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }
}
