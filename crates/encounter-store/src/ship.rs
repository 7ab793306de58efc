//! In-memory `ShipRepository`.

use std::sync::RwLock;

use async_trait::async_trait;
use encounter_core::error::EncounterError;
use encounter_core::ship::{ShipModule, ShipRepository};
use tracing::debug;

/// Holds the player ship's module set in memory.
#[derive(Debug, Default)]
pub struct MemoryShipRepository {
    modules: RwLock<Vec<ShipModule>>,
}

fn poisoned() -> EncounterError {
    EncounterError::ResolutionFailure("ship lock poisoned".to_owned())
}

impl MemoryShipRepository {
    /// Creates a ship with the given modules installed.
    #[must_use]
    pub fn new(modules: Vec<ShipModule>) -> Self {
        Self {
            modules: RwLock::new(modules),
        }
    }

    /// Returns the installed modules.
    ///
    /// # Errors
    ///
    /// Returns `EncounterError::ResolutionFailure` if the lock is poisoned.
    pub fn modules(&self) -> Result<Vec<ShipModule>, EncounterError> {
        Ok(self.modules.read().map_err(|_| poisoned())?.clone())
    }
}

#[async_trait]
impl ShipRepository for MemoryShipRepository {
    async fn load_modules(&self) -> Result<Vec<ShipModule>, EncounterError> {
        self.modules()
    }

    async fn commit_modules(&self, modules: Vec<ShipModule>) -> Result<(), EncounterError> {
        debug!(count = modules.len(), "committing ship modules");
        *self.modules.write().map_err(|_| poisoned())? = modules;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_commit_replaces_module_set() {
        // Arrange
        let repo = MemoryShipRepository::new(vec![ShipModule {
            id: Uuid::nil(),
            module_type: "engine".to_owned(),
            traits: Vec::new(),
        }]);
        let replacement = vec![ShipModule {
            id: Uuid::max(),
            module_type: "shield".to_owned(),
            traits: Vec::new(),
        }];

        // Act
        repo.commit_modules(replacement.clone()).await.unwrap();

        // Assert
        assert_eq!(repo.load_modules().await.unwrap(), replacement);
    }
}
