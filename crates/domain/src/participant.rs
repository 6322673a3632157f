//! Participant capability - the game-state holder a dialogue talks to
//!
//! Participants are owned by the host application. The dialogue engine only
//! ever sees them through this trait: entry events are pushed into them and
//! conditions query them. Methods take `&self`; a participant that keeps
//! mutable state does so behind its own interior mutability.

/// A speaker or state holder addressed by name from dialogue content.
#[cfg_attr(test, mockall::automock)]
pub trait Participant: Send + Sync {
    // =========================================================================
    // Event sinks
    // =========================================================================

    /// A named signal fired from a node's entry events.
    fn on_dialogue_event(&self, event_name: &str);

    /// Set (`delta == false`) or add to (`delta == true`) an integer value.
    fn modify_int(&self, value_name: &str, delta: bool, value: i32);

    /// Set or add to a float value.
    fn modify_float(&self, value_name: &str, delta: bool, value: f32);

    fn modify_bool(&self, value_name: &str, value: bool);

    fn modify_name(&self, value_name: &str, value: &str);

    // =========================================================================
    // Condition queries
    // =========================================================================

    /// Answers an `EventCall` condition.
    fn check_condition(&self, callback_name: &str) -> bool;

    fn get_int(&self, value_name: &str) -> i32;

    fn get_float(&self, value_name: &str) -> f32;

    fn get_bool(&self, value_name: &str) -> bool;

    fn get_name(&self, value_name: &str) -> String;
}
