//! Event - a side effect applied to a participant on node entry

use serde::{Deserialize, Serialize};

use crate::participant::Participant;

/// Which participant operation an event drives.
///
/// Archived as its discriminant; any other value is rejected when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// Fire a named signal
    #[default]
    Event,
    ModifyInt,
    ModifyFloat,
    ModifyBool,
    ModifyName,
}

/// An entry event descriptor.
///
/// Field order is the binary record layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    /// Empty means "the participant of the owning node"
    pub participant_name: String,
    pub event_name: String,
    pub int_value: i32,
    pub float_value: f32,
    pub name_value: String,
    /// Add to the current value instead of replacing it (int and float only)
    pub is_delta: bool,
    pub bool_value: bool,
    pub kind: EventKind,
}

impl Event {
    pub fn signal(participant_name: &str, event_name: &str) -> Self {
        Self {
            participant_name: participant_name.to_string(),
            event_name: event_name.to_string(),
            kind: EventKind::Event,
            ..Self::default()
        }
    }

    pub fn modify_int(participant_name: &str, value_name: &str, value: i32, is_delta: bool) -> Self {
        Self {
            int_value: value,
            is_delta,
            kind: EventKind::ModifyInt,
            ..Self::signal(participant_name, value_name)
        }
    }

    pub fn modify_float(
        participant_name: &str,
        value_name: &str,
        value: f32,
        is_delta: bool,
    ) -> Self {
        Self {
            float_value: value,
            is_delta,
            kind: EventKind::ModifyFloat,
            ..Self::signal(participant_name, value_name)
        }
    }

    pub fn modify_bool(participant_name: &str, value_name: &str, value: bool) -> Self {
        Self {
            bool_value: value,
            kind: EventKind::ModifyBool,
            ..Self::signal(participant_name, value_name)
        }
    }

    pub fn modify_name(participant_name: &str, value_name: &str, value: &str) -> Self {
        Self {
            name_value: value.to_string(),
            kind: EventKind::ModifyName,
            ..Self::signal(participant_name, value_name)
        }
    }

    /// The participant this event addresses, given the owning node's.
    pub fn resolved_participant_name<'a>(&'a self, default_participant: &'a str) -> &'a str {
        if self.participant_name.is_empty() {
            default_participant
        } else {
            &self.participant_name
        }
    }

    /// Apply the event. Does nothing when no participant was resolved.
    pub fn dispatch(&self, target: Option<&dyn Participant>) {
        let Some(target) = target else {
            return;
        };

        match self.kind {
            EventKind::Event => target.on_dialogue_event(&self.event_name),
            EventKind::ModifyInt => target.modify_int(&self.event_name, self.is_delta, self.int_value),
            EventKind::ModifyFloat => {
                target.modify_float(&self.event_name, self.is_delta, self.float_value)
            }
            EventKind::ModifyBool => target.modify_bool(&self.event_name, self.bool_value),
            EventKind::ModifyName => target.modify_name(&self.event_name, &self.name_value),
        }
    }
}
