//! Switch nodes.

use encounter_content::domain::edge::Edge;
use encounter_content::domain::edges::SwitchEdge;
use tracing::debug;

use super::{HandlerContext, first_passing};
use crate::domain::continuation::Continuation;

/// Branches on the first edge whose filter passes, or continues linearly.
///
/// `random_weight` is not consulted.
pub(super) async fn handle(edges: &[SwitchEdge], ctx: &mut HandlerContext<'_>) -> Continuation {
    match first_passing(edges, ctx).await {
        Some(edge) => {
            debug!(edge_id = edge.id(), "switch edge selected");
            Continuation::to_target(edge.next_log_id.as_ref())
        }
        None => Continuation::Linear,
    }
}
