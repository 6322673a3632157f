//! Dialogue flow engine.
//!
//! Runs branching dialogue assets from `dlgflow-domain` against a host
//! game's participants.
//!
//! ## Structure
//!
//! - `context/` - One playthrough: node entry, option evaluation, selection
//! - `stores/` - Long-term visit memory shared between contexts
//! - `infrastructure/` - Configuration, logging, randomness and archives
//! - `error` - Engine error types

pub mod context;
pub mod error;
pub mod infrastructure;
pub mod stores;

/// Test fixtures: participants, JSON dialogues and builders.
#[cfg(test)]
pub mod test_fixtures;


pub use context::{ContextState, DialogueContext, DialogueOption};
pub use error::DialogueError;
pub use infrastructure::archive::ArchiveError;
pub use infrastructure::config::{ChildEvaluationPolicy, EngineConfig};
pub use infrastructure::ports::RandomPort;
pub use infrastructure::random::SystemRandom;
pub use stores::DialogueMemory;
