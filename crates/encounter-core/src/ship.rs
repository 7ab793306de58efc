//! Ship module abstractions.
//!
//! Module, module-swap and module-trait nodes rewrite the player ship's module
//! set. The ship itself lives outside the engine behind `ShipRepository`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EncounterError;

/// A trait (perk or flaw) attached to a ship module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleTrait {
    /// Stable trait identifier.
    pub id: String,
    /// Family the trait belongs to; removal can target a whole family.
    pub family_id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// An installed ship module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipModule {
    /// Instance identifier.
    pub id: Uuid,
    /// Module type; a ship carries at most one module per type.
    pub module_type: String,
    /// Traits attached to this instance.
    #[serde(default)]
    pub traits: Vec<ModuleTrait>,
}

/// Access to the player ship's module set.
#[async_trait]
pub trait ShipRepository: Send + Sync {
    /// Loads the current module set.
    async fn load_modules(&self) -> Result<Vec<ShipModule>, EncounterError>;

    /// Replaces the module set with `modules`.
    async fn commit_modules(&self, modules: Vec<ShipModule>) -> Result<(), EncounterError>;
}
