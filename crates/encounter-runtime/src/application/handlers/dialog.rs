//! Dialog nodes.

use encounter_content::domain::edge::Edge;
use encounter_content::domain::edges::DialogEdge;
use encounter_content::domain::node::LogNode;

use super::{HandlerContext, first_passing};
use crate::domain::continuation::Continuation;
use crate::domain::request::{DialogOutcome, DialogRequest, EncounterRequest};

pub(super) async fn handle(
    node: &LogNode,
    edges: &[DialogEdge],
    ctx: &mut HandlerContext<'_>,
) -> Continuation {
    let Some(edge) = first_passing(edges, ctx).await else {
        return Continuation::Linear;
    };

    let outcome = ctx
        .requests
        .halt(|completion| {
            EncounterRequest::Dialog(DialogRequest {
                node_id: node.id.clone(),
                edge_id: edge.id().to_owned(),
                title: edge.title.clone(),
                message: edge.message.clone(),
                completion,
            })
        })
        .await;

    match outcome {
        Ok(DialogOutcome::Success) => Continuation::to_target(edge.success_log_id.as_ref()),
        Ok(DialogOutcome::Failure) => Continuation::to_target(edge.failure_log_id.as_ref()),
        Ok(DialogOutcome::Cancel) => Continuation::to_target(edge.cancel_log_id.as_ref()),
        Err(err) => {
            ctx.record(err);
            Continuation::Linear
        }
    }
}

#[cfg(test)]
mod tests {
    use encounter_content::domain::edge::EdgeHeader;
    use encounter_content::domain::filter::{Comparator, FilterEntry, ValueFilterModel};
    use encounter_content::domain::node::{LogId, LogNodeKind};
    use encounter_core::address::KeyValueAddress;
    use encounter_test_support::RecordingKeyValueStore;

    use super::*;
    use crate::application::handlers::test_support::{Harness, no_response};

    fn dialog(id: &str, index: i32, filter: ValueFilterModel) -> DialogEdge {
        DialogEdge {
            header: EdgeHeader::new(id, index),
            filter,
            title: format!("{id} title"),
            message: "Open fire?".to_owned(),
            success_log_id: Some(LogId::new("fight")),
            failure_log_id: Some(LogId::new("flee")),
            cancel_log_id: None,
        }
    }

    fn never() -> ValueFilterModel {
        ValueFilterModel::new(vec![FilterEntry::Boolean {
            lhs: KeyValueAddress::local(true),
            comparator: Comparator::Equal,
            rhs: KeyValueAddress::local(false),
        }])
    }

    fn answer(outcome: DialogOutcome) -> impl FnOnce(EncounterRequest) + Send + 'static {
        move |request| match request {
            EncounterRequest::Dialog(request) => {
                assert_eq!(request.edge_id, "second");
                request.completion.complete(outcome).unwrap();
            }
            other => panic!("expected dialog request, got {other:?}"),
        }
    }

    fn node() -> LogNode {
        LogNode::new(
            "standoff",
            LogNodeKind::Dialog {
                edges: vec![
                    dialog("first", 0, never()),
                    dialog("second", 1, ValueFilterModel::empty()),
                ],
            },
        )
        .then("fallback")
    }

    #[tokio::test]
    async fn test_outcomes_map_to_named_continuations() {
        // Arrange
        let node = node();
        let mut harness = Harness::new(RecordingKeyValueStore::new());

        // Act
        let success = harness.activate(&node, answer(DialogOutcome::Success)).await;
        let failure = harness.activate(&node, answer(DialogOutcome::Failure)).await;
        let cancel = harness.activate(&node, answer(DialogOutcome::Cancel)).await;

        // Assert
        assert_eq!(success.continuation, Continuation::Branch(LogId::new("fight")));
        assert_eq!(failure.continuation, Continuation::Branch(LogId::new("flee")));
        assert_eq!(cancel.continuation, Continuation::Linear);
    }

    #[tokio::test]
    async fn test_no_passing_edge_does_not_halt() {
        let node = LogNode::new(
            "standoff",
            LogNodeKind::Dialog {
                edges: vec![dialog("first", 0, never())],
            },
        );
        let mut harness = Harness::new(RecordingKeyValueStore::new());

        let activation = harness.activate(&node, no_response).await;

        assert_eq!(activation.continuation, Continuation::Linear);
    }
}
