//! dlgflow domain - the data model of branching dialogues.
//!
//! Pure types and invariants only: no I/O, no logging, no runtime state.
//! Traversal lives in `dlgflow-engine`.

pub mod entities;
pub mod error;
pub mod ids;
pub mod participant;
pub mod value_objects;

// Re-export all entities (explicit list in entities/mod.rs)
pub use entities::{
    ComparisonOperation, Condition, ConditionKind, ConditionStrength, Dialogue, Edge, Event,
    EventKind, Node, NodeKind, SelectorKind, SpeechNode, SpeechSequence, SpeechSequenceEntry,
    VisitQuery,
};

pub use error::DomainError;

// Re-export ID types
pub use ids::{DialogueId, INDEX_NONE};

pub use participant::Participant;

pub use value_objects::History;
