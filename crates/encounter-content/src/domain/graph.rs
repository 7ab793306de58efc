//! Encounter graphs.
//!
//! A graph is immutable once built. Construction validates the structural
//! invariants the runner relies on, so a walk never meets a missing node.

use std::collections::{HashMap, HashSet};

use encounter_core::error::EncounterError;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::filter::ValueFilterModel;
use super::node::{LogId, LogNode, LogNodeKind};

/// Raw, unvalidated graph as authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterGraphDocument {
    /// Unique encounter identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Conditions under which the encounter may start. Passes when empty.
    #[serde(default)]
    pub trigger: ValueFilterModel,
    /// The nodes, in authored order.
    pub nodes: Vec<LogNode>,
}

/// A validated encounter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "EncounterGraphDocument")]
pub struct EncounterGraph {
    id: String,
    name: String,
    trigger: ValueFilterModel,
    nodes: Vec<LogNode>,
    #[serde(skip)]
    positions: HashMap<LogId, usize>,
    #[serde(skip)]
    beginning: usize,
}

impl EncounterGraph {
    /// Builds and validates a graph.
    ///
    /// # Errors
    ///
    /// Returns `EncounterError::MalformedGraph` if the graph does not have
    /// exactly one beginning node, repeats a node id, references a node id
    /// that does not exist, or holds a binary operation without `input1`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        trigger: ValueFilterModel,
        nodes: Vec<LogNode>,
    ) -> Result<Self, EncounterError> {
        let id = id.into();

        let mut positions = HashMap::with_capacity(nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            if positions.insert(node.id.clone(), position).is_some() {
                return Err(EncounterError::MalformedGraph(format!(
                    "encounter {id}: duplicate node id {}",
                    node.id
                )));
            }
        }

        let beginnings: Vec<usize> = nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.beginning)
            .map(|(i, _)| i)
            .collect();
        let beginning = match beginnings.as_slice() {
            [single] => *single,
            [] => {
                return Err(EncounterError::MalformedGraph(format!(
                    "encounter {id}: no beginning node"
                )));
            }
            many => {
                let ids: Vec<&str> = many.iter().map(|&i| nodes[i].id.as_str()).collect();
                return Err(EncounterError::MalformedGraph(format!(
                    "encounter {id}: {} beginning nodes ({})",
                    many.len(),
                    ids.join(", ")
                )));
            }
        };

        for node in &nodes {
            if let Some(missing) = node.targets().into_iter().find(|t| !positions.contains_key(*t))
            {
                return Err(EncounterError::MalformedGraph(format!(
                    "encounter {id}: node {} continues to unknown node {missing}",
                    node.id
                )));
            }
        }

        for node in &nodes {
            let LogNodeKind::KeyValue { edges } = &node.kind else {
                continue;
            };
            if let Some(edge) = edges
                .iter()
                .find(|e| !e.header.ignore && e.operation.lacks_second_operand())
            {
                return Err(EncounterError::MalformedGraph(format!(
                    "encounter {id}: node {} edge {} has a binary {} operation without input1",
                    node.id,
                    edge.header.id,
                    edge.operation.type_name()
                )));
            }
        }

        if !nodes.iter().any(|n| n.ending) {
            warn!(encounter_id = %id, "encounter has no ending node");
        }

        Ok(Self {
            id,
            name: name.into(),
            trigger,
            nodes,
            positions,
            beginning,
        })
    }

    /// Returns the encounter identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the trigger filter.
    #[must_use]
    pub fn trigger(&self) -> &ValueFilterModel {
        &self.trigger
    }

    /// Returns all nodes in authored order.
    #[must_use]
    pub fn nodes(&self) -> &[LogNode] {
        &self.nodes
    }

    /// Returns the unique beginning node.
    #[must_use]
    pub fn beginning(&self) -> &LogNode {
        &self.nodes[self.beginning]
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&LogNode> {
        self.positions.get(id).map(|&i| &self.nodes[i])
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes. Never true for a valid graph.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of nodes that cannot be reached from the beginning node.
    #[must_use]
    pub fn unreachable_nodes(&self) -> Vec<&LogId> {
        let mut seen: HashSet<&LogId> = HashSet::new();
        let mut pending = vec![&self.beginning().id];
        while let Some(id) = pending.pop() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(node) = self.node(id.as_str()) {
                pending.extend(node.targets());
            }
        }
        self.nodes
            .iter()
            .map(|n| &n.id)
            .filter(|id| !seen.contains(id))
            .collect()
    }
}

impl TryFrom<EncounterGraphDocument> for EncounterGraph {
    type Error = EncounterError;

    fn try_from(document: EncounterGraphDocument) -> Result<Self, Self::Error> {
        Self::new(document.id, document.name, document.trigger, document.nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(id: &str) -> LogNode {
        LogNode::new(
            id,
            LogNodeKind::Text {
                title: String::new(),
                message: format!("node {id}"),
            },
        )
    }

    #[test]
    fn test_new_accepts_single_beginning_and_indexes_nodes() {
        // Arrange
        let nodes = vec![text("a").beginning().then("b"), text("b").ending()];

        // Act
        let graph = EncounterGraph::new("derelict", "Derelict", ValueFilterModel::empty(), nodes)
            .unwrap();

        // Assert
        assert_eq!(graph.beginning().id, LogId::new("a"));
        assert!(graph.node("b").unwrap().ending);
        assert!(graph.node("zzz").is_none());
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_binary_operation_without_second_operand_is_rejected() {
        // Arrange
        let yaml = r"
id: broken_ledger
nodes:
  - id: pay
    kind: key_value
    beginning: true
    ending: true
    edges:
      - id: charge
        operation:
          type: integer
          operation: subtract
          input0: { source: store_reference, scope: global, key: credits }
          output: { source: store_reference, scope: global, key: credits }
";

        // Act
        let result: Result<EncounterGraph, _> = serde_yaml::from_str(yaml);

        // Assert
        let message = result.unwrap_err().to_string();
        assert!(message.contains("node pay edge charge"), "{message}");
        assert!(message.contains("without input1"), "{message}");
    }

    #[test]
    fn test_new_rejects_missing_beginning() {
        let result = EncounterGraph::new("e", "", ValueFilterModel::empty(), vec![text("a")]);

        assert!(matches!(result, Err(EncounterError::MalformedGraph(_))));
    }

    #[test]
    fn test_new_rejects_two_beginnings() {
        // Arrange
        let nodes = vec![text("a").beginning(), text("b").beginning()];

        // Act
        let result = EncounterGraph::new("e", "", ValueFilterModel::empty(), nodes);

        // Assert
        match result {
            Err(EncounterError::MalformedGraph(message)) => {
                assert!(message.contains("2 beginning nodes"));
            }
            other => panic!("expected MalformedGraph, got {other:?}"),
        }
    }

    #[test]
    fn test_new_rejects_duplicate_ids() {
        let nodes = vec![text("a").beginning(), text("a")];

        let result = EncounterGraph::new("e", "", ValueFilterModel::empty(), nodes);

        assert!(matches!(result, Err(EncounterError::MalformedGraph(m)) if m.contains("duplicate")));
    }

    #[test]
    fn test_new_rejects_dangling_continuation() {
        let nodes = vec![text("a").beginning().then("nowhere")];

        let result = EncounterGraph::new("e", "", ValueFilterModel::empty(), nodes);

        assert!(matches!(result, Err(EncounterError::MalformedGraph(m)) if m.contains("nowhere")));
    }

    #[test]
    fn test_deserialization_runs_validation() {
        let yaml = r"
id: broken
nodes:
  - id: a
    kind: text
    message: no beginning here
";
        let result: Result<EncounterGraph, _> = serde_yaml::from_str(yaml);

        assert!(result.is_err());
    }

    #[test]
    fn test_unreachable_nodes_lists_orphans() {
        let nodes = vec![text("a").beginning().then("b"), text("b").ending(), text("orphan")];
        let graph = EncounterGraph::new("e", "", ValueFilterModel::empty(), nodes).unwrap();

        let orphans: Vec<&str> = graph.unreachable_nodes().into_iter().map(LogId::as_str).collect();

        assert_eq!(orphans, vec!["orphan"]);
    }
}
