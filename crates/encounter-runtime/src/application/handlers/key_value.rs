//! Key-value nodes.

use encounter_content::domain::edge::{Edge, ordered_edges};
use encounter_content::domain::edges::KeyValueEdge;
use tracing::debug;

use super::HandlerContext;
use crate::application::operation::execute_operation;
use crate::domain::continuation::Continuation;

/// Runs each operation in index order, one at a time. A failed operation is
/// recorded and skipped; later operations still run.
pub(super) async fn handle(edges: &[KeyValueEdge], ctx: &mut HandlerContext<'_>) -> Continuation {
    for edge in ordered_edges(edges) {
        debug!(edge_id = edge.id(), value_type = edge.operation.type_name(), "executing operation");
        if let Err(err) = execute_operation(&edge.operation, ctx.store, ctx.rng).await {
            ctx.record(err);
        }
    }
    Continuation::Linear
}
