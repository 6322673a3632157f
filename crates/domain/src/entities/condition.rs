//! Condition - predicate descriptors gating edges and node entry
//!
//! Conditions are plain data. They are evaluated against the participant they
//! name (falling back to the owning node's participant) and against the
//! visit history of the running dialogue.

use serde::{Deserialize, Serialize};

use crate::ids::INDEX_NONE;
use crate::participant::Participant;

/// Difference below which two floats compare as equal.
const FLOAT_TOLERANCE: f32 = 1.0e-8;

/// How a condition participates in the evaluation of its array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionStrength {
    /// Must pass (AND)
    #[default]
    Strong,
    /// At least one weak condition in the array must pass (OR)
    Weak,
}

/// What a condition asks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionKind {
    /// `participant.check_condition(callback)` must equal `bool_value`
    #[default]
    EventCall,
    /// `participant.get_bool(callback)` must equal `bool_value`
    BoolCall,
    /// `participant.get_int(callback)` compared against `int_value`
    IntCall,
    /// `participant.get_float(callback)` compared against `float_value`
    FloatCall,
    /// `participant.get_name(callback)` compared against `name_value`
    NameCall,
    /// Whether `node_index` was visited must equal `bool_value`
    WasNodeVisited,
}

impl ConditionKind {
    /// Whether this kind needs a resolved participant to be evaluated.
    pub fn requires_participant(self) -> bool {
        !matches!(self, ConditionKind::WasNodeVisited)
    }
}

/// Comparison used by the value-call kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonOperation {
    #[default]
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl ComparisonOperation {
    pub fn compare<T: PartialOrd + ?Sized>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            ComparisonOperation::Equal => lhs == rhs,
            ComparisonOperation::NotEqual => lhs != rhs,
            ComparisonOperation::Less => lhs < rhs,
            ComparisonOperation::LessOrEqual => lhs <= rhs,
            ComparisonOperation::Greater => lhs > rhs,
            ComparisonOperation::GreaterOrEqual => lhs >= rhs,
        }
    }

    /// Float comparison with a tolerance on (in)equality.
    pub fn compare_float(self, lhs: f32, rhs: f32) -> bool {
        let nearly_equal = (lhs - rhs).abs() <= FLOAT_TOLERANCE;
        match self {
            ComparisonOperation::Equal => nearly_equal,
            ComparisonOperation::NotEqual => !nearly_equal,
            ComparisonOperation::LessOrEqual => nearly_equal || lhs < rhs,
            ComparisonOperation::GreaterOrEqual => nearly_equal || lhs > rhs,
            ComparisonOperation::Less | ComparisonOperation::Greater => self.compare(&lhs, &rhs),
        }
    }
}

/// Answers "was this node visited?" for `WasNodeVisited` conditions.
///
/// `long_term` selects the persisted memory of the dialogue instance; otherwise
/// only the current playthrough counts.
pub trait VisitQuery {
    fn was_node_visited(&self, node_index: i32, long_term: bool) -> bool;
}

/// A predicate descriptor.
///
/// Field order is the binary record layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Condition {
    pub strength: ConditionStrength,
    pub kind: ConditionKind,
    /// Empty means "the participant of the owning node"
    pub participant_name: String,
    pub callback_name: String,
    pub operation: ComparisonOperation,
    pub int_value: i32,
    pub float_value: f32,
    pub name_value: String,
    pub bool_value: bool,
    pub node_index: i32,
    pub long_term_memory: bool,
}

impl Default for Condition {
    fn default() -> Self {
        Self {
            strength: ConditionStrength::default(),
            kind: ConditionKind::default(),
            participant_name: String::new(),
            callback_name: String::new(),
            operation: ComparisonOperation::default(),
            int_value: 0,
            float_value: 0.0,
            name_value: String::new(),
            bool_value: false,
            node_index: INDEX_NONE,
            long_term_memory: false,
        }
    }
}

impl Condition {
    fn with_kind(kind: ConditionKind, participant_name: &str, callback_name: &str) -> Self {
        Self {
            kind,
            participant_name: participant_name.to_string(),
            callback_name: callback_name.to_string(),
            ..Self::default()
        }
    }

    pub fn event_call(participant_name: &str, callback_name: &str, expected: bool) -> Self {
        Self {
            bool_value: expected,
            ..Self::with_kind(ConditionKind::EventCall, participant_name, callback_name)
        }
    }

    pub fn bool_call(participant_name: &str, value_name: &str, expected: bool) -> Self {
        Self {
            bool_value: expected,
            ..Self::with_kind(ConditionKind::BoolCall, participant_name, value_name)
        }
    }

    pub fn int_call(
        participant_name: &str,
        value_name: &str,
        operation: ComparisonOperation,
        value: i32,
    ) -> Self {
        Self {
            operation,
            int_value: value,
            ..Self::with_kind(ConditionKind::IntCall, participant_name, value_name)
        }
    }

    pub fn float_call(
        participant_name: &str,
        value_name: &str,
        operation: ComparisonOperation,
        value: f32,
    ) -> Self {
        Self {
            operation,
            float_value: value,
            ..Self::with_kind(ConditionKind::FloatCall, participant_name, value_name)
        }
    }

    pub fn name_call(
        participant_name: &str,
        value_name: &str,
        operation: ComparisonOperation,
        value: &str,
    ) -> Self {
        Self {
            operation,
            name_value: value.to_string(),
            ..Self::with_kind(ConditionKind::NameCall, participant_name, value_name)
        }
    }

    pub fn was_node_visited(node_index: i32, expected: bool, long_term_memory: bool) -> Self {
        Self {
            kind: ConditionKind::WasNodeVisited,
            node_index,
            bool_value: expected,
            long_term_memory,
            ..Self::default()
        }
    }

    /// Turn this into a weak (OR-group) condition.
    pub fn weak(mut self) -> Self {
        self.strength = ConditionStrength::Weak;
        self
    }

    /// The participant this condition addresses, given the owning node's.
    pub fn resolved_participant_name<'a>(&'a self, default_participant: &'a str) -> &'a str {
        if self.participant_name.is_empty() {
            default_participant
        } else {
            &self.participant_name
        }
    }

    /// Evaluate a single condition.
    ///
    /// A condition that needs a participant fails when none was resolved.
    pub fn evaluate(&self, participant: Option<&dyn Participant>, visits: &dyn VisitQuery) -> bool {
        match (self.kind, participant) {
            (ConditionKind::WasNodeVisited, _) => {
                visits.was_node_visited(self.node_index, self.long_term_memory) == self.bool_value
            }
            (_, None) => false,
            (ConditionKind::EventCall, Some(participant)) => {
                participant.check_condition(&self.callback_name) == self.bool_value
            }
            (ConditionKind::BoolCall, Some(participant)) => {
                participant.get_bool(&self.callback_name) == self.bool_value
            }
            (ConditionKind::IntCall, Some(participant)) => self
                .operation
                .compare(&participant.get_int(&self.callback_name), &self.int_value),
            (ConditionKind::FloatCall, Some(participant)) => self
                .operation
                .compare_float(participant.get_float(&self.callback_name), self.float_value),
            (ConditionKind::NameCall, Some(participant)) => self.operation.compare(
                participant.get_name(&self.callback_name).as_str(),
                self.name_value.as_str(),
            ),
        }
    }

    /// Evaluate an ordered condition array.
    ///
    /// Every strong condition must pass, and when weak conditions exist at
    /// least one of them must pass. An empty array passes.
    pub fn evaluate_all<F>(conditions: &[Condition], mut evaluate: F) -> bool
    where
        F: FnMut(&Condition) -> bool,
    {
        let mut has_weak = false;
        let mut weak_passed = false;

        for condition in conditions {
            match condition.strength {
                ConditionStrength::Strong => {
                    if !evaluate(condition) {
                        return false;
                    }
                }
                ConditionStrength::Weak => {
                    has_weak = true;
                    if !weak_passed && evaluate(condition) {
                        weak_passed = true;
                    }
                }
            }
        }

        weak_passed || !has_weak
    }
}
