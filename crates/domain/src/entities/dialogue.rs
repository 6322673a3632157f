//! Dialogue - the immutable-at-runtime asset holding the node graph
//!
//! Nodes are addressed by their position in `nodes`. Indices are dense,
//! zero-based and stable for the lifetime of the asset; every edge refers to
//! its target through one of them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::entities::{Node, NodeKind};
use crate::error::DomainError;
use crate::ids::DialogueId;

/// A dialogue asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dialogue {
    id: DialogueId,
    name: String,
    nodes: Vec<Node>,
    /// Index of the node entered when the dialogue starts
    #[serde(default)]
    start_index: usize,
}

impl Dialogue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: DialogueId::new(),
            name: name.into(),
            nodes: Vec::new(),
            start_index: 0,
        }
    }

    // Read accessors
    pub fn id(&self) -> DialogueId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn is_valid_node_index(&self, index: i32) -> bool {
        usize::try_from(index).is_ok_and(|index| index < self.nodes.len())
    }

    // Builder methods
    pub fn with_id(mut self, id: DialogueId) -> Self {
        self.id = id;
        self
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn with_start_index(mut self, start_index: usize) -> Self {
        self.start_index = start_index;
        self
    }

    /// Append a node, returning its index.
    pub fn add_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Mutable access for authoring tools. Not used while a dialogue runs.
    pub fn node_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.nodes.get_mut(index)
    }

    /// Every participant name referenced anywhere in the asset.
    pub fn associated_participants(&self) -> BTreeSet<String> {
        self.nodes
            .iter()
            .flat_map(Node::associated_participants)
            .collect()
    }

    /// Authoring validation: the start index must point at a `Start` node,
    /// and every connected edge must land inside the node list.
    pub fn validate(&self) -> Result<(), DomainError> {
        let Some(start) = self.nodes.get(self.start_index) else {
            return Err(DomainError::validation(format!(
                "dialogue '{}' has no node at start index {}",
                self.name, self.start_index
            )));
        };
        if !matches!(start.kind(), NodeKind::Start) {
            return Err(DomainError::validation(format!(
                "start node of dialogue '{}' is {}, expected Start",
                self.name,
                start.kind().type_name()
            )));
        }

        let mut problems = Vec::new();
        for (node_index, node) in self.nodes.iter().enumerate() {
            for (edge_index, edge) in node.children().iter().enumerate() {
                if edge.is_valid() && edge.target_within(self.nodes.len()).is_none() {
                    problems.push(format!(
                        "edge {} of node {} targets missing node {}",
                        edge_index, node_index, edge.target_index
                    ));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation(problems.join("; ")))
        }
    }
}
