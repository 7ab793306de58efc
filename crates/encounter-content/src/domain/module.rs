//! Ship-module payloads carried by module, module-swap and module-trait edges.

use encounter_core::ship::ModuleTrait;
use serde::{Deserialize, Serialize};

/// Template from which a fresh module instance is generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleBlueprint {
    /// Type of the generated module.
    pub module_type: String,
    /// Traits the generated module starts with.
    #[serde(default)]
    pub traits: Vec<ModuleTrait>,
}

/// A change to the traits of installed modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TraitOperation {
    /// Attach a trait, unless one with the same id is already attached.
    Append {
        /// The trait to attach.
        #[serde(rename = "trait")]
        module_trait: ModuleTrait,
    },
    /// Detach the trait with this id.
    RemoveById {
        /// Trait id.
        trait_id: String,
    },
    /// Detach every trait of this family.
    RemoveByFamilyId {
        /// Family id.
        family_id: String,
    },
    /// A trait action this engine does not know.
    #[serde(other)]
    Unknown,
}
