//! Conversation nodes.

use encounter_content::domain::edge::{Edge, ordered_edges};
use encounter_content::domain::edges::ConversationEdge;
use encounter_content::domain::node::LogNode;
use encounter_core::error::EncounterError;

use super::{HandlerContext, first_passing};
use crate::domain::continuation::Continuation;
use crate::domain::request::{
    ConversationReply, ConversationRequest, EncounterRequest, PromptOption,
};

/// Presents the first passing entry and follows the chosen prompt, or the
/// entry's own continuation when the player moves on without one.
pub(super) async fn handle(
    node: &LogNode,
    edges: &[ConversationEdge],
    ctx: &mut HandlerContext<'_>,
) -> Continuation {
    let Some(edge) = first_passing(edges, ctx).await else {
        return Continuation::Linear;
    };
    let prompts = ordered_edges(&edge.prompts);

    let reply = ctx
        .requests
        .halt(|completion| {
            EncounterRequest::Conversation(ConversationRequest {
                node_id: node.id.clone(),
                edge_id: edge.id().to_owned(),
                speaker: edge.speaker.clone(),
                message: edge.message.clone(),
                prompts: prompts
                    .iter()
                    .map(|p| PromptOption {
                        prompt_id: p.id().to_owned(),
                        text: p.text.clone(),
                    })
                    .collect(),
                completion,
            })
        })
        .await;

    match reply {
        Ok(ConversationReply::Continue) => Continuation::to_target(edge.next_log_id.as_ref()),
        Ok(ConversationReply::Prompt(prompt_id)) => {
            match prompts.iter().find(|p| p.id() == prompt_id) {
                Some(prompt) => Continuation::to_target(prompt.next_log_id.as_ref()),
                None => {
                    ctx.record(EncounterError::unrecognized("conversation prompt", prompt_id));
                    Continuation::Linear
                }
            }
        }
        Err(err) => {
            ctx.record(err);
            Continuation::Linear
        }
    }
}
