//! Domain entities - the dialogue graph and the records hanging off it

mod condition;
mod dialogue;
mod edge;
mod event;
mod node;
mod speech_sequence;

pub use condition::{
    ComparisonOperation, Condition, ConditionKind, ConditionStrength, VisitQuery,
};
pub use dialogue::Dialogue;
pub use edge::Edge;
pub use event::{Event, EventKind};
pub use node::{Node, NodeKind, SelectorKind, SpeechNode};
pub use speech_sequence::{SpeechSequence, SpeechSequenceEntry};
