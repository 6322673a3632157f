//! Error types for dialogue traversal.

use dlgflow_domain::DomainError;

use crate::infrastructure::archive::ArchiveError;

/// Errors surfaced to the host while driving a dialogue.
///
/// Recoverable authoring gaps (a missing participant, an edge without a
/// target) are not errors: they are logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum DialogueError {
    /// The caller picked an option that is not on offer.
    #[error("Option {index} is not available ({available} options)")]
    InvalidOptionIndex { index: usize, available: usize },

    /// A node index outside of the dialogue's node list.
    #[error("Node {index} does not exist ({node_count} nodes)")]
    InvalidNodeIndex { index: i64, node_count: usize },

    /// The context has no active node yet.
    #[error("Dialogue has not been started")]
    NotStarted,

    /// The dialogue asset has no nodes at all.
    #[error("Dialogue '{0}' has no nodes")]
    EmptyDialogue(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

impl DialogueError {
    pub fn invalid_option(index: usize, available: usize) -> Self {
        Self::InvalidOptionIndex { index, available }
    }

    pub fn invalid_node(index: i64, node_count: usize) -> Self {
        Self::InvalidNodeIndex { index, node_count }
    }

    /// Whether the error reports a caller contract violation rather than a
    /// problem with content or storage.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidOptionIndex { .. } | Self::InvalidNodeIndex { .. } | Self::NotStarted
        )
    }
}
