//! Unified error types for the domain layer
//!
//! Provides a common error type for authoring-time operations on dialogue
//! assets, so callers never have to fall back to String errors.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed (e.g., dangling edge targets)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Index outside of the owning collection
    #[error("Index {index} out of range for {collection} (len {len})")]
    IndexOutOfRange {
        collection: &'static str,
        index: usize,
        len: usize,
    },

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a validation error for authoring rule violations.
    ///
    /// Use this when asset invariants are violated:
    /// - Edges pointing past the end of the node list
    /// - A missing or mistyped start node
    ///
    /// # Example
    /// ```ignore
    /// if nodes.is_empty() {
    ///     return Err(DomainError::validation("dialogue has no nodes"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an index out of range error
    pub fn index_out_of_range(collection: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            collection,
            index,
            len,
        }
    }

    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
