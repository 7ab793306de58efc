//! Text nodes.

use encounter_content::domain::node::LogNode;

use super::HandlerContext;
use crate::domain::continuation::Continuation;
use crate::domain::request::{EncounterRequest, TextRequest};

/// Emits a display request and continues without waiting.
pub(super) fn handle(
    node: &LogNode,
    title: &str,
    message: &str,
    ctx: &mut HandlerContext<'_>,
) -> Continuation {
    let request = EncounterRequest::Text(TextRequest {
        node_id: node.id.clone(),
        title: title.to_owned(),
        message: message.to_owned(),
        display_seconds: node.display_seconds(message),
    });
    if let Err(err) = ctx.requests.present(request) {
        ctx.record(err);
    }
    Continuation::Linear
}
