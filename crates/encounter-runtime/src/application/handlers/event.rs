//! Encounter event nodes: gameplay the game layer runs and reports back on.

use encounter_content::domain::edge::Edge;
use encounter_content::domain::edges::EncounterEventEdge;
use encounter_content::domain::node::LogNode;

use super::{HandlerContext, first_passing};
use crate::domain::continuation::Continuation;
use crate::domain::request::{EncounterEventRequest, EncounterRequest, EventOutcome};

pub(super) async fn handle(
    node: &LogNode,
    edges: &[EncounterEventEdge],
    ctx: &mut HandlerContext<'_>,
) -> Continuation {
    let Some(edge) = first_passing(edges, ctx).await else {
        return Continuation::Linear;
    };

    let outcome = ctx
        .requests
        .halt(|completion| {
            EncounterRequest::EncounterEvent(EncounterEventRequest {
                node_id: node.id.clone(),
                edge_id: edge.id().to_owned(),
                event: edge.event.clone(),
                parameters: edge.parameters.clone(),
                completion,
            })
        })
        .await;

    match outcome {
        Ok(EventOutcome::Success) => Continuation::to_target(edge.success_log_id.as_ref()),
        Ok(EventOutcome::Failure) => Continuation::to_target(edge.failure_log_id.as_ref()),
        Err(err) => {
            ctx.record(err);
            Continuation::Linear
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use encounter_content::domain::edge::EdgeHeader;
    use encounter_content::domain::filter::{Comparator, FilterEntry, ValueFilterModel};
    use encounter_content::domain::node::{LogId, LogNodeKind};
    use encounter_core::address::KeyValueAddress;
    use encounter_core::store::{Scope, StoreValue};
    use encounter_test_support::RecordingKeyValueStore;

    use super::*;
    use crate::application::handlers::test_support::Harness;

    fn combat(id: &str, index: i32, filter: ValueFilterModel, enemy: &str) -> EncounterEventEdge {
        EncounterEventEdge {
            header: EdgeHeader::new(id, index),
            filter,
            event: "combat".to_owned(),
            parameters: BTreeMap::from([("enemy".to_owned(), enemy.to_owned())]),
            success_log_id: Some(LogId::new("loot")),
            failure_log_id: Some(LogId::new("game_over")),
        }
    }

    #[tokio::test]
    async fn test_first_passing_event_is_run_and_outcome_branches() {
        // Arrange
        let store = RecordingKeyValueStore::with_values([(
            Scope::Global,
            "faction",
            StoreValue::String("pirates".to_owned()),
        )]);
        let pirate_only = ValueFilterModel::new(vec![FilterEntry::String {
            lhs: KeyValueAddress::reference(Scope::Global, "faction"),
            comparator: Comparator::Equal,
            rhs: KeyValueAddress::local("navy".to_owned()),
        }]);
        let node = LogNode::new(
            "ambush",
            LogNodeKind::EncounterEvent {
                edges: vec![
                    combat("navy_patrol", 0, pirate_only, "navy"),
                    combat("raiders", 1, ValueFilterModel::empty(), "raiders"),
                ],
            },
        );
        let mut harness = Harness::new(store);

        // Act
        let activation = harness
            .activate(&node, |request| match request {
                EncounterRequest::EncounterEvent(request) => {
                    assert_eq!(request.parameters["enemy"], "raiders");
                    request.completion.complete(EventOutcome::Failure).unwrap();
                }
                other => panic!("expected event request, got {other:?}"),
            })
            .await;

        // Assert
        assert_eq!(
            activation.continuation,
            Continuation::Branch(LogId::new("game_over"))
        );
    }
}
