//! Content-layer request protocol.
//!
//! The runner emits one `EncounterRequest` per presenting node on an
//! unbounded channel. Halting requests carry a `Completion` that the content
//! layer resolves once the player has acted; the walk stays suspended until
//! then.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use encounter_content::domain::node::LogId;
use serde::{Deserialize, Serialize};
use tokio::sync::{oneshot, watch};

use super::status::{RequestPhase, WalkState, WalkStatus};

/// One-shot resolution handle for a halting request.
pub struct Completion<T> {
    sender: oneshot::Sender<T>,
    status: Arc<watch::Sender<WalkStatus>>,
}

impl<T> Completion<T> {
    pub(crate) fn new(sender: oneshot::Sender<T>, status: Arc<watch::Sender<WalkStatus>>) -> Self {
        Self { sender, status }
    }

    /// Moves the walk from `Request` to `Handle`. No-op in any other state.
    pub fn mark_handling(&self) {
        self.status.send_if_modified(|status| {
            if status.state == WalkState::Halted(RequestPhase::Request) {
                status.state = WalkState::Halted(RequestPhase::Handle);
                true
            } else {
                false
            }
        });
    }

    /// Resumes the walk with `value`.
    ///
    /// # Errors
    ///
    /// Returns the value back if the walk is no longer waiting for it.
    pub fn complete(self, value: T) -> Result<(), T> {
        self.sender.send(value)
    }

    /// Returns `true` if the walk stopped waiting for this completion.
    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.sender.is_closed()
    }
}

impl<T> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("abandoned", &self.sender.is_closed())
            .finish_non_exhaustive()
    }
}

/// Outcome of a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogOutcome {
    Success,
    Failure,
    Cancel,
}

/// The player's answer to a conversation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationReply {
    /// The prompt with this id was chosen.
    Prompt(String),
    /// The player moved on without choosing a prompt.
    Continue,
}

/// Outcome of a gameplay event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOutcome {
    Success,
    Failure,
}

/// Text to display. Does not halt the walk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRequest {
    pub node_id: LogId,
    pub title: String,
    pub message: String,
    pub display_seconds: f32,
}

/// A button as offered to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonOption {
    pub edge_id: String,
    pub message: String,
    pub used: bool,
    pub interactable: bool,
}

/// A set of buttons. Resolved with the clicked edge id.
#[derive(Debug, Serialize)]
pub struct ButtonRequest {
    pub node_id: LogId,
    pub buttons: Vec<ButtonOption>,
    #[serde(skip)]
    pub completion: Completion<String>,
}

/// A modal dialog with success, failure and cancel outcomes.
#[derive(Debug, Serialize)]
pub struct DialogRequest {
    pub node_id: LogId,
    pub edge_id: String,
    pub title: String,
    pub message: String,
    #[serde(skip)]
    pub completion: Completion<DialogOutcome>,
}

/// A reply the player may pick in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptOption {
    pub prompt_id: String,
    pub text: String,
}

/// A line of conversation with optional replies.
#[derive(Debug, Serialize)]
pub struct ConversationRequest {
    pub node_id: LogId,
    pub edge_id: String,
    pub speaker: String,
    pub message: String,
    pub prompts: Vec<PromptOption>,
    #[serde(skip)]
    pub completion: Completion<ConversationReply>,
}

/// A character portrait with a line of text. Resolved once dismissed.
#[derive(Debug, Serialize)]
pub struct BustRequest {
    pub node_id: LogId,
    pub edge_id: String,
    pub character: String,
    pub expression: Option<String>,
    pub message: String,
    pub display_seconds: f32,
    #[serde(skip)]
    pub completion: Completion<()>,
}

/// A gameplay event the game layer runs and reports back on.
#[derive(Debug, Serialize)]
pub struct EncounterEventRequest {
    pub node_id: LogId,
    pub edge_id: String,
    pub event: String,
    pub parameters: BTreeMap<String, String>,
    #[serde(skip)]
    pub completion: Completion<EventOutcome>,
}

/// Everything the engine asks of the content layer.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EncounterRequest {
    Text(TextRequest),
    Button(ButtonRequest),
    Dialog(DialogRequest),
    Conversation(ConversationRequest),
    Bust(BustRequest),
    EncounterEvent(EncounterEventRequest),
}

impl EncounterRequest {
    /// Returns the node that emitted the request.
    #[must_use]
    pub fn node_id(&self) -> &LogId {
        match self {
            Self::Text(r) => &r.node_id,
            Self::Button(r) => &r.node_id,
            Self::Dialog(r) => &r.node_id,
            Self::Conversation(r) => &r.node_id,
            Self::Bust(r) => &r.node_id,
            Self::EncounterEvent(r) => &r.node_id,
        }
    }

    /// Returns the snake-case request type.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Button(_) => "button",
            Self::Dialog(_) => "dialog",
            Self::Conversation(_) => "conversation",
            Self::Bust(_) => "bust",
            Self::EncounterEvent(_) => "encounter_event",
        }
    }

    /// Returns `true` if the walk is suspended until this request completes.
    #[must_use]
    pub fn is_halting(&self) -> bool {
        !matches!(self, Self::Text(_))
    }

    /// Marks a halting request as being presented.
    pub fn mark_handling(&self) {
        match self {
            Self::Text(_) => {}
            Self::Button(r) => r.completion.mark_handling(),
            Self::Dialog(r) => r.completion.mark_handling(),
            Self::Conversation(r) => r.completion.mark_handling(),
            Self::Bust(r) => r.completion.mark_handling(),
            Self::EncounterEvent(r) => r.completion.mark_handling(),
        }
    }
}
