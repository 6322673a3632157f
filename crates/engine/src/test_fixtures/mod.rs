//! Test fixtures: JSON dialogue loading, a stateful participant and small
//! dialogue builders.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_fixtures::{dialogues, TestParticipant};
//!
//! #[test]
//! fn test_linear_dialogue_ends() {
//!     let dialogue = dialogues::linear();
//!     // ... test logic
//! }
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use dlgflow_domain::{Dialogue, Participant};

use crate::context::DialogueContext;
use crate::stores::DialogueMemory;

// =============================================================================
// Fixture Loading
// =============================================================================

/// Load a JSON fixture from the crate's `test_data/` directory.
///
/// # Panics
///
/// Panics if the fixture file cannot be read or parsed.
pub fn load_fixture<T: serde::de::DeserializeOwned>(path: &str) -> T {
    let fixture_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join(path);
    let content = std::fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture '{}': {}",
            fixture_path.display(),
            e
        )
    });
    serde_json::from_str(&content).unwrap_or_else(|e| {
        panic!(
            "Failed to parse fixture '{}': {}",
            fixture_path.display(),
            e
        )
    })
}

/// A context over `dialogue` with its own fresh memory.
pub fn context_for(dialogue: Dialogue) -> DialogueContext {
    DialogueContext::new(Arc::new(dialogue), Arc::new(DialogueMemory::new()))
}

// =============================================================================
// Participants
// =============================================================================

#[derive(Debug, Default, Clone)]
struct ParticipantState {
    ints: HashMap<String, i32>,
    floats: HashMap<String, f32>,
    bools: HashMap<String, bool>,
    names: HashMap<String, String>,
    conditions: HashMap<String, bool>,
    events: Vec<String>,
}

/// A participant backed by plain maps. Unknown values read as defaults.
#[derive(Debug, Default)]
pub struct TestParticipant {
    state: Mutex<ParticipantState>,
}

impl TestParticipant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_int(self, name: &str, value: i32) -> Self {
        self.set_int(name, value);
        self
    }

    pub fn with_float(self, name: &str, value: f32) -> Self {
        self.state.lock().unwrap().floats.insert(name.to_string(), value);
        self
    }

    pub fn with_bool(self, name: &str, value: bool) -> Self {
        self.state.lock().unwrap().bools.insert(name.to_string(), value);
        self
    }

    pub fn with_name(self, name: &str, value: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .names
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_condition(self, callback: &str, result: bool) -> Self {
        self.state
            .lock()
            .unwrap()
            .conditions
            .insert(callback.to_string(), result);
        self
    }

    pub fn set_int(&self, name: &str, value: i32) {
        self.state.lock().unwrap().ints.insert(name.to_string(), value);
    }

    pub fn int(&self, name: &str) -> i32 {
        self.get_int(name)
    }

    pub fn float(&self, name: &str) -> f32 {
        self.get_float(name)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.get_bool(name)
    }

    pub fn name(&self, name: &str) -> String {
        self.get_name(name)
    }

    /// Signals received through `on_dialogue_event`, oldest first.
    pub fn events(&self) -> Vec<String> {
        self.state.lock().unwrap().events.clone()
    }
}

impl Participant for TestParticipant {
    fn on_dialogue_event(&self, event_name: &str) {
        self.state.lock().unwrap().events.push(event_name.to_string());
    }

    fn modify_int(&self, value_name: &str, delta: bool, value: i32) {
        let mut state = self.state.lock().unwrap();
        let current = state.ints.entry(value_name.to_string()).or_default();
        *current = if delta { *current + value } else { value };
    }

    fn modify_float(&self, value_name: &str, delta: bool, value: f32) {
        let mut state = self.state.lock().unwrap();
        let current = state.floats.entry(value_name.to_string()).or_default();
        *current = if delta { *current + value } else { value };
    }

    fn modify_bool(&self, value_name: &str, value: bool) {
        self.state
            .lock()
            .unwrap()
            .bools
            .insert(value_name.to_string(), value);
    }

    fn modify_name(&self, value_name: &str, value: &str) {
        self.state
            .lock()
            .unwrap()
            .names
            .insert(value_name.to_string(), value.to_string());
    }

    fn check_condition(&self, callback_name: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .conditions
            .get(callback_name)
            .copied()
            .unwrap_or(false)
    }

    fn get_int(&self, value_name: &str) -> i32 {
        self.state
            .lock()
            .unwrap()
            .ints
            .get(value_name)
            .copied()
            .unwrap_or_default()
    }

    fn get_float(&self, value_name: &str) -> f32 {
        self.state
            .lock()
            .unwrap()
            .floats
            .get(value_name)
            .copied()
            .unwrap_or_default()
    }

    fn get_bool(&self, value_name: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .bools
            .get(value_name)
            .copied()
            .unwrap_or_default()
    }

    fn get_name(&self, value_name: &str) -> String {
        self.state
            .lock()
            .unwrap()
            .names
            .get(value_name)
            .cloned()
            .unwrap_or_default()
    }
}

// =============================================================================
// Dialogues
// =============================================================================

pub mod dialogues {
    use dlgflow_domain::{Dialogue, Edge, Node};

    use super::load_fixture;

    /// Innkeeper conversation: start, greeting with a gold-gated room
    /// option, room rental, end. Loaded from `dialogues/tavern.json`.
    pub fn tavern() -> Dialogue {
        load_fixture("dialogues/tavern.json")
    }

    /// `0:start -> 1:"Hello" -> 2:end`
    pub fn linear() -> Dialogue {
        Dialogue::new("Linear")
            .with_node(Node::start().with_child(Edge::new(1)))
            .with_node(Node::speech("Npc", "Hello").with_child(Edge::new(2).with_text("Bye")))
            .with_node(Node::end())
    }
}
