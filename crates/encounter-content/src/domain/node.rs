//! Log nodes: the units of an encounter graph.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::edges::{
    BustEdge, ButtonEdge, ConversationEdge, DialogEdge, EncounterEventEdge, EncyclopediaEdge,
    KeyValueEdge, ModuleEdge, ModuleSwapEdge, ModuleTraitEdge, SwitchEdge,
};

/// Reading speed used for computed durations.
const WORDS_PER_SECOND: f32 = 3.0;

/// Shortest computed display time.
const MIN_COMPUTED_SECONDS: f32 = 2.0;

/// Stable identifier of a log node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogId(String);

impl LogId {
    /// Wraps a string id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for LogId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LogId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for LogId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// How long a node's content stays on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NodeDuration {
    /// An authored number of seconds.
    Fixed {
        /// Seconds on screen.
        seconds: f32,
    },
    /// Derived from the length of the displayed text.
    #[default]
    Computed,
}

/// The kind-specific payload of a log node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogNodeKind {
    Text {
        #[serde(default)]
        title: String,
        message: String,
    },
    KeyValue {
        #[serde(default)]
        edges: Vec<KeyValueEdge>,
    },
    Switch {
        #[serde(default)]
        edges: Vec<SwitchEdge>,
    },
    Button {
        #[serde(default)]
        edges: Vec<ButtonEdge>,
    },
    Conversation {
        #[serde(default)]
        edges: Vec<ConversationEdge>,
    },
    Dialog {
        #[serde(default)]
        edges: Vec<DialogEdge>,
    },
    Module {
        #[serde(default)]
        edges: Vec<ModuleEdge>,
    },
    ModuleSwap {
        #[serde(default)]
        edges: Vec<ModuleSwapEdge>,
    },
    ModuleTrait {
        #[serde(default)]
        edges: Vec<ModuleTraitEdge>,
    },
    Encyclopedia {
        #[serde(default)]
        edges: Vec<EncyclopediaEdge>,
    },
    Bust {
        #[serde(default)]
        edges: Vec<BustEdge>,
    },
    EncounterEvent {
        #[serde(default)]
        edges: Vec<EncounterEventEdge>,
    },
    /// A node kind this engine does not know. Skipped at walk time.
    #[serde(other)]
    Unknown,
}

impl LogNodeKind {
    /// Returns the snake-case kind name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::KeyValue { .. } => "key_value",
            Self::Switch { .. } => "switch",
            Self::Button { .. } => "button",
            Self::Conversation { .. } => "conversation",
            Self::Dialog { .. } => "dialog",
            Self::Module { .. } => "module",
            Self::ModuleSwap { .. } => "module_swap",
            Self::ModuleTrait { .. } => "module_trait",
            Self::Encyclopedia { .. } => "encyclopedia",
            Self::Bust { .. } => "bust",
            Self::EncounterEvent { .. } => "encounter_event",
            Self::Unknown => "unknown",
        }
    }

    /// Returns `true` for kinds whose handler may suspend the walk.
    #[must_use]
    pub fn is_halting(&self) -> bool {
        matches!(
            self,
            Self::Button { .. }
                | Self::Conversation { .. }
                | Self::Dialog { .. }
                | Self::Bust { .. }
                | Self::EncounterEvent { .. }
        )
    }
}

/// One unit of narrative content or logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogNode {
    /// Stable node identifier.
    pub id: LogId,
    /// Author notes; never shown to players.
    #[serde(default)]
    pub notes: String,
    /// Marks the entry node. Exactly one per graph.
    #[serde(default)]
    pub beginning: bool,
    /// Marks a node after which the walk finishes.
    #[serde(default)]
    pub ending: bool,
    #[serde(default)]
    pub duration: NodeDuration,
    /// Linear continuation; for edged kinds, the fallback when no edge applies.
    #[serde(default)]
    pub next_log_id: Option<LogId>,
    #[serde(flatten)]
    pub kind: LogNodeKind,
}

impl LogNode {
    /// Creates a non-terminal node with default duration and no notes.
    #[must_use]
    pub fn new(id: impl Into<LogId>, kind: LogNodeKind) -> Self {
        Self {
            id: id.into(),
            notes: String::new(),
            beginning: false,
            ending: false,
            duration: NodeDuration::Computed,
            next_log_id: None,
            kind,
        }
    }

    /// Marks this node as the graph's entry point.
    #[must_use]
    pub fn beginning(mut self) -> Self {
        self.beginning = true;
        self
    }

    /// Marks this node as terminal.
    #[must_use]
    pub fn ending(mut self) -> Self {
        self.ending = true;
        self
    }

    /// Sets the linear continuation.
    #[must_use]
    pub fn then(mut self, next: impl Into<LogId>) -> Self {
        self.next_log_id = Some(next.into());
        self
    }

    /// Returns the snake-case kind name.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Seconds `text` should stay on screen for this node.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn display_seconds(&self, text: &str) -> f32 {
        match self.duration {
            NodeDuration::Fixed { seconds } => seconds,
            NodeDuration::Computed => {
                let words = text.split_whitespace().count() as f32;
                (words / WORDS_PER_SECOND).max(MIN_COMPUTED_SECONDS)
            }
        }
    }

    /// Every node id this node can continue to, including ignored edges.
    #[must_use]
    pub fn targets(&self) -> Vec<&LogId> {
        let mut targets: Vec<&LogId> = self.next_log_id.iter().collect();
        match &self.kind {
            LogNodeKind::Switch { edges } => {
                targets.extend(edges.iter().filter_map(|e| e.next_log_id.as_ref()));
            }
            LogNodeKind::Button { edges } => {
                targets.extend(edges.iter().filter_map(|e| e.next_log_id.as_ref()));
            }
            LogNodeKind::Conversation { edges } => {
                for edge in edges {
                    targets.extend(edge.next_log_id.as_ref());
                    targets.extend(edge.prompts.iter().filter_map(|p| p.next_log_id.as_ref()));
                }
            }
            LogNodeKind::Dialog { edges } => {
                for edge in edges {
                    targets.extend(edge.success_log_id.as_ref());
                    targets.extend(edge.failure_log_id.as_ref());
                    targets.extend(edge.cancel_log_id.as_ref());
                }
            }
            LogNodeKind::Bust { edges } => {
                targets.extend(edges.iter().filter_map(|e| e.next_log_id.as_ref()));
            }
            LogNodeKind::EncounterEvent { edges } => {
                for edge in edges {
                    targets.extend(edge.success_log_id.as_ref());
                    targets.extend(edge.failure_log_id.as_ref());
                }
            }
            LogNodeKind::Text { .. }
            | LogNodeKind::KeyValue { .. }
            | LogNodeKind::Module { .. }
            | LogNodeKind::ModuleSwap { .. }
            | LogNodeKind::ModuleTrait { .. }
            | LogNodeKind::Encyclopedia { .. }
            | LogNodeKind::Unknown => {}
        }
        targets
    }
}
