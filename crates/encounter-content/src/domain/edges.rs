//! Per-kind edge payloads.

use std::collections::BTreeMap;

use encounter_core::encyclopedia::EncyclopediaArticle;
use serde::{Deserialize, Serialize};

use super::edge::{EdgeHeader, impl_edge};
use super::filter::ValueFilterModel;
use super::module::{ModuleBlueprint, TraitOperation};
use super::node::LogId;
use super::operation::OperationModel;

/// One operation of a key-value node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValueEdge {
    #[serde(flatten)]
    pub header: EdgeHeader,
    /// The read/modify/write to perform.
    pub operation: OperationModel,
}

/// A conditional branch of a switch node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchEdge {
    #[serde(flatten)]
    pub header: EdgeHeader,
    /// Passes when empty.
    #[serde(default)]
    pub filter: ValueFilterModel,
    /// Where to go when this edge wins.
    #[serde(default)]
    pub next_log_id: Option<LogId>,
    /// Authored selection weight. Carried for content compatibility; the
    /// switch handler selects by first match.
    #[serde(default)]
    pub random_weight: f32,
}

/// A player-facing button.
///
/// The three filters and the three store-backed auto flags combine into the
/// button's used, interactable and enabled states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonEdge {
    #[serde(flatten)]
    pub header: EdgeHeader,
    /// Button label.
    pub message: String,
    /// Where a click leads; `None` continues linearly.
    #[serde(default)]
    pub next_log_id: Option<LogId>,
    /// Marks the button as used. Fails when empty.
    #[serde(default)]
    pub used_filtering: ValueFilterModel,
    /// Allows clicking. Passes when empty.
    #[serde(default)]
    pub interactable_filtering: ValueFilterModel,
    /// Shows the button at all. Passes when empty.
    #[serde(default)]
    pub enabled_filtering: ValueFilterModel,
    /// On click, remember the button as used.
    #[serde(default)]
    pub auto_used: bool,
    /// On click, disable further interaction with the button.
    #[serde(default)]
    pub auto_disable_interactions: bool,
    /// On click, hide the button from then on.
    #[serde(default)]
    pub auto_disable_enabled: bool,
}

/// A player reply within a conversation entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationPrompt {
    #[serde(flatten)]
    pub header: EdgeHeader,
    /// Reply text.
    pub text: String,
    /// Where the reply leads; `None` continues linearly.
    #[serde(default)]
    pub next_log_id: Option<LogId>,
}

/// A filtered conversation entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEdge {
    #[serde(flatten)]
    pub header: EdgeHeader,
    /// Passes when empty.
    #[serde(default)]
    pub filter: ValueFilterModel,
    /// Who is talking.
    pub speaker: String,
    /// What they say.
    pub message: String,
    /// Replies offered to the player.
    #[serde(default)]
    pub prompts: Vec<ConversationPrompt>,
    /// Where to go when the player continues without a reply.
    #[serde(default)]
    pub next_log_id: Option<LogId>,
}

/// A filtered modal dialog with three outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogEdge {
    #[serde(flatten)]
    pub header: EdgeHeader,
    /// Passes when empty.
    #[serde(default)]
    pub filter: ValueFilterModel,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub success_log_id: Option<LogId>,
    #[serde(default)]
    pub failure_log_id: Option<LogId>,
    #[serde(default)]
    pub cancel_log_id: Option<LogId>,
}

/// A filtered character portrait with a line of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BustEdge {
    #[serde(flatten)]
    pub header: EdgeHeader,
    /// Passes when empty.
    #[serde(default)]
    pub filter: ValueFilterModel,
    /// Character shown.
    pub character: String,
    /// Portrait expression, if not the default one.
    #[serde(default)]
    pub expression: Option<String>,
    pub message: String,
    #[serde(default)]
    pub next_log_id: Option<LogId>,
}

/// A filtered gameplay event (combat, trade, ...) resolved by the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterEventEdge {
    #[serde(flatten)]
    pub header: EdgeHeader,
    /// Passes when empty.
    #[serde(default)]
    pub filter: ValueFilterModel,
    /// Event name understood by the game layer.
    pub event: String,
    /// Free-form event parameters.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    #[serde(default)]
    pub success_log_id: Option<LogId>,
    #[serde(default)]
    pub failure_log_id: Option<LogId>,
}

/// Installs a freshly generated module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleEdge {
    #[serde(flatten)]
    pub header: EdgeHeader,
    /// Passes when empty.
    #[serde(default)]
    pub filter: ValueFilterModel,
    pub blueprint: ModuleBlueprint,
}

/// Replaces every module of one type with a regenerated one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSwapEdge {
    #[serde(flatten)]
    pub header: EdgeHeader,
    /// Passes when empty.
    #[serde(default)]
    pub filter: ValueFilterModel,
    pub target_module_type: String,
    pub replacement: ModuleBlueprint,
}

/// Changes the traits of installed modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleTraitEdge {
    #[serde(flatten)]
    pub header: EdgeHeader,
    /// Passes when empty.
    #[serde(default)]
    pub filter: ValueFilterModel,
    /// Restricts the change to modules of this type; `None` targets all.
    #[serde(default)]
    pub module_type: Option<String>,
    pub operation: TraitOperation,
}

/// Unlocks an encyclopedia article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncyclopediaEdge {
    #[serde(flatten)]
    pub header: EdgeHeader,
    pub article: EncyclopediaArticle,
}

impl_edge!(
    KeyValueEdge,
    SwitchEdge,
    ButtonEdge,
    ConversationPrompt,
    ConversationEdge,
    DialogEdge,
    BustEdge,
    EncounterEventEdge,
    ModuleEdge,
    ModuleSwapEdge,
    ModuleTraitEdge,
    EncyclopediaEdge,
);
