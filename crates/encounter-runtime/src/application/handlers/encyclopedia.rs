//! Encyclopedia nodes.

use encounter_content::domain::edge::ordered_edges;
use encounter_content::domain::edges::EncyclopediaEdge;
use encounter_core::encyclopedia::EncyclopediaArticle;

use super::HandlerContext;
use crate::domain::continuation::Continuation;

/// Appends a copy of every edge's article under a fresh id. Unfiltered.
pub(super) async fn handle(edges: &[EncyclopediaEdge], ctx: &mut HandlerContext<'_>) -> Continuation {
    for edge in ordered_edges(edges) {
        let article = EncyclopediaArticle {
            id: ctx.rng.next_uuid(),
            ..edge.article.clone()
        };
        if let Err(err) = ctx.encyclopedia.append(article).await {
            ctx.record(err);
        }
    }
    Continuation::Linear
}
