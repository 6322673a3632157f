//! History - the visited-node record of one dialogue instance

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Visited node indices of one dialogue instance.
///
/// Archived as `{visited_node_indices: set<i32>}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    pub visited_node_indices: BTreeSet<i32>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_indices(indices: impl IntoIterator<Item = i32>) -> Self {
        Self {
            visited_node_indices: indices.into_iter().collect(),
        }
    }

    /// Record a visit. Returns false when the index was already present.
    pub fn mark_visited(&mut self, node_index: i32) -> bool {
        self.visited_node_indices.insert(node_index)
    }

    pub fn is_visited(&self, node_index: i32) -> bool {
        self.visited_node_indices.contains(&node_index)
    }

    pub fn len(&self) -> usize {
        self.visited_node_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited_node_indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marking_twice_is_idempotent() {
        let mut history = History::new();
        assert!(history.mark_visited(3));
        let once = history.clone();
        assert!(!history.mark_visited(3));
        assert_eq!(history, once);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn from_indices_deduplicates() {
        let history = History::from_indices([1, 2, 2, 5]);
        assert_eq!(history.len(), 3);
        assert!(history.is_visited(5));
        assert!(!history.is_visited(4));
    }
}
