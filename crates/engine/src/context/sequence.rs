//! Speech sequences: several beats shown one after another inside a single
//! node. Moving between beats is internal; it writes no memory and fires no
//! events. Only the last beat offers the node's real children.

use std::collections::HashSet;

use dlgflow_domain::{Node, SpeechSequence};

use super::{ContextState, DialogueContext, DialogueOption};
use crate::error::DialogueError;

impl DialogueContext {
    pub(crate) fn sequence_cursor(&self, node_index: usize) -> usize {
        self.sequence_cursors.get(&node_index).copied().unwrap_or(0)
    }

    /// Before the last beat the single option is the synthetic inner edge
    /// for the current beat; on the last beat the real children apply. A
    /// sequence without beats offers nothing.
    pub(super) fn reevaluate_sequence(
        &mut self,
        node_index: usize,
        node: &Node,
        sequence: &SpeechSequence,
        already_evaluated: &mut HashSet<usize>,
    ) -> bool {
        let cursor = self.sequence_cursor(node_index);
        if sequence.is_last(cursor) {
            return self.reevaluate_edges(node, already_evaluated);
        }

        self.clear_options();
        let Some(edge) = sequence.inner_edge(cursor) else {
            return false;
        };

        self.options.push(edge.clone());
        self.all_options.push(DialogueOption {
            edge: edge.clone(),
            satisfied: true,
        });
        self.state = ContextState::AwaitingSelection;
        true
    }

    pub(super) fn sequence_option_selected(
        &mut self,
        node_index: usize,
        node: &Node,
        sequence: &SpeechSequence,
        option_index: usize,
    ) -> Result<bool, DialogueError> {
        let cursor = self.sequence_cursor(node_index);
        if !sequence.is_last(cursor) {
            self.sequence_cursors.insert(node_index, cursor + 1);
            tracing::trace!(node_index, cursor = cursor + 1, "Advanced speech sequence");
            return Ok(self.reevaluate_sequence(node_index, node, sequence, &mut HashSet::new()));
        }

        // Game state may have moved since the options were offered.
        self.reevaluate_edges(node, &mut HashSet::new());
        if option_index >= self.options.len() {
            return Err(DialogueError::invalid_option(option_index, self.options.len()));
        }
        Ok(self.select_edge(option_index))
    }
}
