//! Handler continuations.

use encounter_content::domain::node::LogId;

/// How a walk proceeds after a node has been handled.
///
/// Every activation yields exactly one value, so a handler can neither skip
/// nor repeat its continuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    /// Follow the node's own `next_log_id`.
    Linear,
    /// Jump to the given node.
    Branch(LogId),
}

impl Continuation {
    /// Branches to `target` if present, otherwise continues linearly.
    #[must_use]
    pub fn to_target(target: Option<&LogId>) -> Self {
        target.map_or(Self::Linear, |id| Self::Branch(id.clone()))
    }
}
