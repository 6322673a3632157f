//! Stores - state shared between contexts.

mod memory;

pub use memory::DialogueMemory;
