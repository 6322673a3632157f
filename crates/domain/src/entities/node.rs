//! Node - a unit of dialogue content or logic
//!
//! A node's identity is its index in the owning dialogue. All variants share
//! the same participant, enter conditions, enter events and children; the
//! variant decides how entering, option evaluation and selection behave.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::entities::{Condition, Edge, Event, SpeechSequence};
use crate::error::DomainError;

/// Content of a plain speech node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechNode {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    /// Skip straight into the first satisfied child after firing events
    #[serde(default)]
    pub is_virtual_parent: bool,
}

impl SpeechNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// How a selector node picks among its satisfied children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectorKind {
    #[default]
    First,
    Random,
}

impl std::str::FromStr for SelectorKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "random" => Ok(Self::Random),
            _ => Err(DomainError::parse(format!("Unknown selector kind: {}", s))),
        }
    }
}

/// Node variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum NodeKind {
    /// Entry point, advances into its first satisfied child
    Start,
    /// The default node: a line of text with the node's children as options
    Speech(SpeechNode),
    /// Several lines shown one by one before the real children
    SpeechSequence(SpeechSequence),
    /// Logic only, enters one satisfied child immediately
    Selector { selector: SelectorKind },
    /// Dialogue ends here
    End,
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::Speech(SpeechNode::default())
    }
}

impl NodeKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Start => "Start",
            NodeKind::Speech(_) => "Speech",
            NodeKind::SpeechSequence(_) => "SpeechSequence",
            NodeKind::Selector { .. } => "Selector",
            NodeKind::End => "End",
        }
    }

    /// Whether entering this node moves on without waiting for a choice.
    pub fn auto_advances(&self) -> bool {
        match self {
            NodeKind::Start | NodeKind::Selector { .. } => true,
            NodeKind::Speech(speech) => speech.is_virtual_parent,
            NodeKind::SpeechSequence(_) | NodeKind::End => false,
        }
    }
}

/// A dialogue node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(default)]
    participant_name: String,
    /// Only satisfied if one of the children is (see the child policy)
    #[serde(default)]
    check_children_on_evaluation: bool,
    #[serde(default)]
    enter_conditions: Vec<Condition>,
    #[serde(default)]
    enter_events: Vec<Event>,
    #[serde(default)]
    children: Vec<Edge>,
    #[serde(default)]
    kind: NodeKind,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn start() -> Self {
        Self::new(NodeKind::Start)
    }

    pub fn speech(participant_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(NodeKind::Speech(SpeechNode::new(text))).with_participant(participant_name)
    }

    pub fn virtual_parent(participant_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(NodeKind::Speech(SpeechNode {
            is_virtual_parent: true,
            ..SpeechNode::new(text)
        }))
        .with_participant(participant_name)
    }

    pub fn speech_sequence(sequence: SpeechSequence) -> Self {
        Self::new(NodeKind::SpeechSequence(sequence))
    }

    pub fn selector(selector: SelectorKind) -> Self {
        Self::new(NodeKind::Selector { selector })
    }

    pub fn end() -> Self {
        Self::new(NodeKind::End)
    }

    // Read accessors
    pub fn participant_name(&self) -> &str {
        &self.participant_name
    }

    pub fn check_children_on_evaluation(&self) -> bool {
        self.check_children_on_evaluation
    }

    pub fn enter_conditions(&self) -> &[Condition] {
        &self.enter_conditions
    }

    pub fn enter_events(&self) -> &[Event] {
        &self.enter_events
    }

    pub fn children(&self) -> &[Edge] {
        &self.children
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_end(&self) -> bool {
        matches!(self.kind, NodeKind::End)
    }

    pub fn speech_sequence_data(&self) -> Option<&SpeechSequence> {
        match &self.kind {
            NodeKind::SpeechSequence(sequence) => Some(sequence),
            _ => None,
        }
    }

    // Builder methods
    pub fn with_participant(mut self, participant_name: impl Into<String>) -> Self {
        self.participant_name = participant_name.into();
        self
    }

    pub fn with_check_children_on_evaluation(mut self, check: bool) -> Self {
        self.check_children_on_evaluation = check;
        self
    }

    pub fn with_enter_condition(mut self, condition: Condition) -> Self {
        self.enter_conditions.push(condition);
        self
    }

    pub fn with_enter_event(mut self, event: Event) -> Self {
        self.enter_events.push(event);
        self
    }

    pub fn with_child(mut self, edge: Edge) -> Self {
        self.children.push(edge);
        self
    }

    // Setter methods for authoring tools
    pub fn set_participant_name(&mut self, participant_name: impl Into<String>) {
        self.participant_name = participant_name.into();
    }

    pub fn set_enter_conditions(&mut self, conditions: Vec<Condition>) {
        self.enter_conditions = conditions;
    }

    pub fn set_enter_events(&mut self, events: Vec<Event>) {
        self.enter_events = events;
    }

    pub fn set_children(&mut self, children: Vec<Edge>) {
        self.children = children;
    }

    pub fn set_kind(&mut self, kind: NodeKind) {
        self.kind = kind;
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn add_child(&mut self, edge: Edge) {
        self.children.push(edge);
    }

    pub fn remove_child_at(&mut self, edge_index: usize) -> Result<Edge, DomainError> {
        if edge_index >= self.children.len() {
            return Err(DomainError::index_out_of_range(
                "children",
                edge_index,
                self.children.len(),
            ));
        }
        Ok(self.children.remove(edge_index))
    }

    pub fn remove_all_children(&mut self) {
        self.children.clear();
    }

    pub fn child_mut(&mut self, edge_index: usize) -> Option<&mut Edge> {
        self.children.get_mut(edge_index)
    }

    /// The first edge leading to `target_index`.
    pub fn child_for_target_mut(&mut self, target_index: i32) -> Option<&mut Edge> {
        self.children
            .iter_mut()
            .find(|edge| edge.target_index == target_index)
    }

    /// Indices of the children that have no valid target.
    pub fn open_children(&self) -> Vec<usize> {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, edge)| !edge.is_valid())
            .map(|(index, _)| index)
            .collect()
    }

    /// Every participant name referenced by this node, its conditions,
    /// events, edges and (for sequences) speakers.
    pub fn associated_participants(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        let mut add = |name: &str| {
            if !name.is_empty() {
                names.insert(name.to_string());
            }
        };

        add(&self.participant_name);
        for condition in &self.enter_conditions {
            add(&condition.participant_name);
        }
        for event in &self.enter_events {
            add(&event.participant_name);
        }
        for edge in &self.children {
            for condition in &edge.conditions {
                add(&condition.participant_name);
            }
        }
        if let NodeKind::SpeechSequence(sequence) = &self.kind {
            for entry in sequence.entries() {
                add(&entry.speaker);
            }
        }

        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::SpeechSequenceEntry;

    mod editing {
        use super::*;

        #[test]
        fn remove_child_checks_bounds() {
            let mut node = Node::speech("Ann", "Hi").with_child(Edge::new(1));
            assert!(node.remove_child_at(3).is_err());
            assert_eq!(node.remove_child_at(0), Ok(Edge::new(1)));
            assert!(node.children().is_empty());
        }

        #[test]
        fn child_for_target_finds_first_match() {
            let mut node = Node::speech("Ann", "Hi")
                .with_child(Edge::new(2).with_text("a"))
                .with_child(Edge::new(2).with_text("b"));
            let edge = node.child_for_target_mut(2).unwrap();
            assert_eq!(edge.text, "a");
            assert!(node.child_for_target_mut(5).is_none());
        }

        #[test]
        fn open_children_lists_unconnected_edges() {
            let node = Node::speech("Ann", "Hi")
                .with_child(Edge::new(1))
                .with_child(Edge::unconnected())
                .with_child(Edge::new(-3));
            assert_eq!(node.open_children(), vec![1, 2]);
        }
    }

    mod participants {
        use super::*;

        #[test]
        fn gathers_names_from_everywhere() {
            let node = Node::speech_sequence(SpeechSequence::new(vec![
                SpeechSequenceEntry::new("Bob", "One"),
                SpeechSequenceEntry::new("", "Two"),
            ]))
            .with_participant("Ann")
            .with_enter_condition(Condition::bool_call("Guard", "awake", true))
            .with_enter_event(Event::signal("Crowd", "cheer"))
            .with_child(
                Edge::new(1).with_condition(Condition::int_call(
                    "Merchant",
                    "gold",
                    crate::entities::ComparisonOperation::Greater,
                    0,
                )),
            );

            let names: Vec<String> = node.associated_participants().into_iter().collect();
            assert_eq!(names, vec!["Ann", "Bob", "Crowd", "Guard", "Merchant"]);
        }

        #[test]
        fn empty_names_are_skipped() {
            assert!(Node::start().associated_participants().is_empty());
        }
    }

    mod kinds {
        use super::*;

        #[test]
        fn auto_advance_only_for_logic_nodes() {
            assert!(Node::start().kind().auto_advances());
            assert!(Node::selector(SelectorKind::Random).kind().auto_advances());
            assert!(Node::virtual_parent("Ann", "...").kind().auto_advances());
            assert!(!Node::speech("Ann", "Hi").kind().auto_advances());
            assert!(!Node::end().kind().auto_advances());
        }

        #[test]
        fn selector_kind_parses_case_insensitively() {
            assert_eq!("Random".parse::<SelectorKind>(), Ok(SelectorKind::Random));
            assert!("sideways".parse::<SelectorKind>().is_err());
        }

        #[test]
        fn node_json_is_tagged_by_type() {
            let json = serde_json::to_value(Node::selector(SelectorKind::First)).unwrap();
            assert_eq!(json["kind"]["type"], "selector");
            assert_eq!(json["kind"]["selector"], "first");

            let restored: Node = serde_json::from_value(json).unwrap();
            assert_eq!(restored, Node::selector(SelectorKind::First));
        }
    }
}
