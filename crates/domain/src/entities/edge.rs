//! Edge - a conditional, directed link between dialogue nodes

use serde::{Deserialize, Serialize};

use crate::entities::Condition;
use crate::ids::INDEX_NONE;

/// A child link of a node, pointing into the owning dialogue's node list.
///
/// Field order is the binary record layout: `target_index`, `text`,
/// `conditions`. Two edges are equal iff all three are equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Index of the target node, `INDEX_NONE` when unset
    pub target_index: i32,
    /// Player-facing choice text
    #[serde(default)]
    pub text: String,
    /// Required but not sufficient - the target's enter conditions count too
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Default for Edge {
    fn default() -> Self {
        Self::unconnected()
    }
}

impl Edge {
    /// A plain edge without text or conditions.
    pub fn new(target_index: i32) -> Self {
        Self {
            target_index,
            text: String::new(),
            conditions: Vec::new(),
        }
    }

    /// An edge that leads nowhere; only its text is meaningful.
    pub fn unconnected() -> Self {
        Self::new(INDEX_NONE)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.conditions = conditions;
        self
    }

    /// Whether the edge has a target at all. Says nothing about bounds.
    pub fn is_valid(&self) -> bool {
        self.target_index > INDEX_NONE
    }

    /// The target as a node-list index, only if it is inside `node_count`.
    pub fn target_within(&self, node_count: usize) -> Option<usize> {
        if !self.is_valid() {
            return None;
        }
        usize::try_from(self.target_index)
            .ok()
            .filter(|index| *index < node_count)
    }
}
