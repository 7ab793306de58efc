//! Bust nodes: a character portrait with a line of text.

use encounter_content::domain::edge::Edge;
use encounter_content::domain::edges::BustEdge;
use encounter_content::domain::node::LogNode;

use super::{HandlerContext, first_passing};
use crate::domain::continuation::Continuation;
use crate::domain::request::{BustRequest, EncounterRequest};

pub(super) async fn handle(
    node: &LogNode,
    edges: &[BustEdge],
    ctx: &mut HandlerContext<'_>,
) -> Continuation {
    let Some(edge) = first_passing(edges, ctx).await else {
        return Continuation::Linear;
    };

    let dismissed = ctx
        .requests
        .halt(|completion| {
            EncounterRequest::Bust(BustRequest {
                node_id: node.id.clone(),
                edge_id: edge.id().to_owned(),
                character: edge.character.clone(),
                expression: edge.expression.clone(),
                message: edge.message.clone(),
                display_seconds: node.display_seconds(&edge.message),
                completion,
            })
        })
        .await;

    match dismissed {
        Ok(()) => Continuation::to_target(edge.next_log_id.as_ref()),
        Err(err) => {
            ctx.record(err);
            Continuation::Linear
        }
    }
}

#[cfg(test)]
mod tests {
    use encounter_content::domain::edge::EdgeHeader;
    use encounter_content::domain::filter::ValueFilterModel;
    use encounter_content::domain::node::{LogId, LogNodeKind, NodeDuration};
    use encounter_test_support::RecordingKeyValueStore;

    use super::*;
    use crate::application::handlers::test_support::Harness;

    #[tokio::test]
    async fn test_dismissal_follows_edge_target() {
        // Arrange
        let mut node = LogNode::new(
            "captain_speaks",
            LogNodeKind::Bust {
                edges: vec![BustEdge {
                    header: EdgeHeader::new("line", 0),
                    filter: ValueFilterModel::empty(),
                    character: "captain".to_owned(),
                    expression: Some("stern".to_owned()),
                    message: "Hold position.".to_owned(),
                    next_log_id: Some(LogId::new("wait")),
                }],
            },
        );
        node.duration = NodeDuration::Fixed { seconds: 6.0 };
        let mut harness = Harness::new(RecordingKeyValueStore::new());

        // Act
        let activation = harness
            .activate(&node, |request| match request {
                EncounterRequest::Bust(request) => {
                    assert_eq!(request.expression.as_deref(), Some("stern"));
                    assert!((request.display_seconds - 6.0).abs() < f32::EPSILON);
                    request.completion.complete(()).unwrap();
                }
                other => panic!("expected bust request, got {other:?}"),
            })
            .await;

        // Assert
        assert_eq!(activation.continuation, Continuation::Branch(LogId::new("wait")));
        assert!(activation.diagnostics.is_empty());
    }
}
