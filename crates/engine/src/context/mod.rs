//! Dialogue context - one running playthrough of a dialogue asset.
//!
//! The context owns all transient traversal state: the active node, the
//! options currently on offer, the nodes visited in this playthrough and the
//! speech-sequence cursors. The asset itself is shared and never mutated.
//!
//! A step (`start`, `option_selected`, `resume`) runs to completion through
//! direct recursion. Two guards bound it:
//! - `entered_this_step` holds the nodes entered during one step; entering
//!   one of them again fails instead of re-firing its events, and the set
//!   may not grow past `max_step_depth`.
//! - condition checks thread the set of nodes whose children are being
//!   expanded; a node met again on that path fails, and the path may not
//!   grow past `max_evaluation_depth`.

mod evaluation;
mod sequence;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use dlgflow_domain::{Dialogue, DialogueId, Edge, Node, NodeKind, Participant, SelectorKind};

use crate::error::DialogueError;
use crate::infrastructure::archive;
use crate::infrastructure::config::EngineConfig;
use crate::infrastructure::ports::RandomPort;
use crate::infrastructure::random::SystemRandom;
use crate::stores::DialogueMemory;

/// Where a context is in its step cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextState {
    /// No node entered yet
    #[default]
    Idle,
    /// A node was entered and its events fired; options not computed yet
    Entered,
    /// At least one option is on offer
    AwaitingSelection,
    /// No option is on offer; the dialogue is over
    Terminal,
}

/// An edge of the active node together with its evaluation result.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueOption {
    pub edge: Edge,
    pub satisfied: bool,
}

/// The per-playthrough orchestrator.
pub struct DialogueContext {
    dialogue: Arc<Dialogue>,
    instance_id: DialogueId,
    participants: HashMap<String, Arc<dyn Participant>>,
    memory: Arc<DialogueMemory>,
    config: EngineConfig,
    random: Arc<dyn RandomPort>,

    state: ContextState,
    active_node: Option<usize>,
    options: Vec<Edge>,
    all_options: Vec<DialogueOption>,
    visited_nodes: BTreeSet<i32>,
    sequence_cursors: HashMap<usize, usize>,
}

impl DialogueContext {
    /// A context playing `dialogue`, recording into `memory` under the
    /// dialogue's own id.
    pub fn new(dialogue: Arc<Dialogue>, memory: Arc<DialogueMemory>) -> Self {
        let instance_id = dialogue.id();
        Self {
            dialogue,
            instance_id,
            participants: HashMap::new(),
            memory,
            config: EngineConfig::default(),
            random: Arc::new(SystemRandom::new()),
            state: ContextState::Idle,
            active_node: None,
            options: Vec::new(),
            all_options: Vec::new(),
            visited_nodes: BTreeSet::new(),
            sequence_cursors: HashMap::new(),
        }
    }

    /// Load a JSON dialogue asset and check it before playing.
    pub fn from_path(
        path: impl AsRef<std::path::Path>,
        memory: Arc<DialogueMemory>,
    ) -> Result<Self, DialogueError> {
        let dialogue = archive::load_dialogue(path)?;
        dialogue.validate()?;
        Ok(Self::new(Arc::new(dialogue), memory))
    }

    // Builder methods

    /// Record history under a different identity than the asset's id, e.g.
    /// one history per NPC or per save slot.
    pub fn with_instance_id(mut self, instance_id: DialogueId) -> Self {
        self.instance_id = instance_id;
        self
    }

    pub fn with_participant(
        mut self,
        name: impl Into<String>,
        participant: Arc<dyn Participant>,
    ) -> Self {
        self.participants.insert(name.into(), participant);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_random(mut self, random: Arc<dyn RandomPort>) -> Self {
        self.random = random;
        self
    }

    // =========================================================================
    // Steps
    // =========================================================================

    /// Enter the start node. Returns whether the dialogue is still running.
    pub fn start(&mut self) -> Result<bool, DialogueError> {
        let start_index = self.validate_node_index(self.dialogue.start_index())?;
        self.warn_missing_participants();
        self.reset_playthrough();

        tracing::debug!(
            dialogue = %self.dialogue.name(),
            instance = %self.instance_id,
            start_index,
            "Starting dialogue"
        );

        let mut entered_this_step = HashSet::new();
        let running = self.enter_node(start_index, &mut entered_this_step);
        Ok(self.finish_step(running))
    }

    /// Rebuild a playthrough at `node_index` without firing entry events.
    ///
    /// The node's children are evaluated and exposed as-is; logic nodes do
    /// not auto-advance on resume.
    pub fn resume(
        &mut self,
        node_index: usize,
        visited_nodes: impl IntoIterator<Item = i32>,
    ) -> Result<bool, DialogueError> {
        let node_index = self.validate_node_index(node_index)?;
        self.reset_playthrough();
        self.visited_nodes = visited_nodes.into_iter().collect();
        self.active_node = Some(node_index);
        self.state = ContextState::Entered;
        self.sequence_cursors.insert(node_index, 0);

        tracing::debug!(
            dialogue = %self.dialogue.name(),
            instance = %self.instance_id,
            node_index,
            "Resuming dialogue"
        );

        let running = self.reevaluate_children(node_index, &mut HashSet::new());
        Ok(self.finish_step(running))
    }

    /// Pick one of the current options.
    ///
    /// An index outside the current option list is rejected before any
    /// memory write or node entry. Returns whether the dialogue is still
    /// running afterwards.
    pub fn option_selected(&mut self, option_index: usize) -> Result<bool, DialogueError> {
        let active = self.active_node.ok_or(DialogueError::NotStarted)?;
        if option_index >= self.options.len() {
            return Err(DialogueError::invalid_option(option_index, self.options.len()));
        }

        let dialogue = Arc::clone(&self.dialogue);
        let node = dialogue
            .node(active)
            .ok_or_else(|| DialogueError::invalid_node(active as i64, dialogue.node_count()))?;

        let running = match node.kind() {
            NodeKind::SpeechSequence(sequence) => {
                self.sequence_option_selected(active, node, sequence, option_index)?
            }
            _ => self.select_edge(option_index),
        };
        Ok(self.finish_step(running))
    }

    /// Recompute the active node's options, e.g. after game state changed
    /// outside the dialogue.
    pub fn reevaluate_options(&mut self) -> Result<bool, DialogueError> {
        let active = self.active_node.ok_or(DialogueError::NotStarted)?;
        let running = self.reevaluate_children(active, &mut HashSet::new());
        Ok(self.finish_step(running))
    }

    // =========================================================================
    // Node entry
    // =========================================================================

    /// Make `node_index` the active node: record the visit, fire its entry
    /// events and let its variant decide what happens next.
    ///
    /// Returns false when the node cannot be entered or leaves nothing to
    /// choose; the caller must not trust it as active with options then.
    pub fn enter_node(&mut self, node_index: usize, entered_this_step: &mut HashSet<usize>) -> bool {
        let dialogue = Arc::clone(&self.dialogue);
        let Some(node) = dialogue.node(node_index) else {
            tracing::warn!(node_index, "Tried to enter a node that does not exist");
            return false;
        };

        if entered_this_step.contains(&node_index) {
            tracing::warn!(node_index, "Node entered twice within one step, stopping the cycle");
            return false;
        }
        if entered_this_step.len() >= self.config.max_step_depth {
            tracing::warn!(
                node_index,
                max_step_depth = self.config.max_step_depth,
                "Step depth limit reached, stopping"
            );
            return false;
        }
        entered_this_step.insert(node_index);

        self.active_node = Some(node_index);
        self.state = ContextState::Entered;
        self.record_visit(node_index);

        tracing::debug!(node_index, kind = node.kind().type_name(), "Entered node");

        self.handle_node_enter(node_index, node, entered_this_step)
    }

    fn handle_node_enter(
        &mut self,
        node_index: usize,
        node: &Node,
        entered_this_step: &mut HashSet<usize>,
    ) -> bool {
        if matches!(node.kind(), NodeKind::SpeechSequence(_)) {
            self.sequence_cursors.insert(node_index, 0);
        }

        self.fire_enter_events(node);

        match node.kind() {
            NodeKind::Start => self.enter_chosen_child(node, SelectorKind::First, entered_this_step),
            NodeKind::Speech(speech) if speech.is_virtual_parent => {
                self.enter_chosen_child(node, SelectorKind::First, entered_this_step)
            }
            NodeKind::Selector { selector } => {
                self.enter_chosen_child(node, *selector, entered_this_step)
            }
            NodeKind::Speech(_) | NodeKind::SpeechSequence(_) | NodeKind::End => {
                self.reevaluate_children(node_index, &mut HashSet::new())
            }
        }
    }

    /// Auto-advance: evaluate the children and enter one of the satisfied
    /// ones within the same step.
    fn enter_chosen_child(
        &mut self,
        node: &Node,
        selector: SelectorKind,
        entered_this_step: &mut HashSet<usize>,
    ) -> bool {
        if !self.reevaluate_edges(node, &mut HashSet::new()) {
            tracing::warn!(
                active_node = ?self.active_node,
                "Auto-advancing node has no satisfied child"
            );
            return false;
        }

        let pick = match selector {
            SelectorKind::First => 0,
            SelectorKind::Random => {
                let last = i32::try_from(self.options.len() - 1).unwrap_or(i32::MAX);
                usize::try_from(self.random.gen_range(0, last))
                    .unwrap_or(0)
                    .min(self.options.len() - 1)
            }
        };

        let Some(target) = self.options[pick].target_within(self.dialogue.node_count()) else {
            return false;
        };
        self.enter_node(target, entered_this_step)
    }

    fn select_edge(&mut self, option_index: usize) -> bool {
        let edge = &self.options[option_index];
        let Some(target) = edge.target_within(self.dialogue.node_count()) else {
            tracing::warn!(option_index, target = edge.target_index, "Selected option has no target");
            return false;
        };

        tracing::debug!(from = ?self.active_node, to = target, option_index, "Option selected");

        let mut entered_this_step = HashSet::new();
        self.enter_node(target, &mut entered_this_step)
    }

    // =========================================================================
    // Option evaluation
    // =========================================================================

    /// Rebuild the option list of `node_index`. Returns false when nothing
    /// is on offer.
    pub fn reevaluate_children(
        &mut self,
        node_index: usize,
        already_evaluated: &mut HashSet<usize>,
    ) -> bool {
        let dialogue = Arc::clone(&self.dialogue);
        let Some(node) = dialogue.node(node_index) else {
            self.clear_options();
            return false;
        };

        match node.kind() {
            NodeKind::SpeechSequence(sequence) => {
                self.reevaluate_sequence(node_index, node, sequence, already_evaluated)
            }
            NodeKind::End => {
                self.clear_options();
                false
            }
            _ => self.reevaluate_edges(node, already_evaluated),
        }
    }

    /// Standard evaluation: every child with a target, in authored order,
    /// kept as an option when its edge evaluates true.
    fn reevaluate_edges(&mut self, node: &Node, already_evaluated: &mut HashSet<usize>) -> bool {
        self.clear_options();

        for edge in node.children() {
            if edge.target_within(self.dialogue.node_count()).is_none() {
                if edge.is_valid() {
                    tracing::warn!(target = edge.target_index, "Edge points outside the dialogue");
                }
                continue;
            }

            let satisfied = self.evaluate_edge(edge, already_evaluated);
            if satisfied {
                self.options.push(edge.clone());
            }
            self.all_options.push(DialogueOption {
                edge: edge.clone(),
                satisfied,
            });
        }

        self.state = if self.options.is_empty() {
            ContextState::Terminal
        } else {
            ContextState::AwaitingSelection
        };
        !self.options.is_empty()
    }

    fn clear_options(&mut self) {
        self.options.clear();
        self.all_options.clear();
        self.state = ContextState::Terminal;
    }

    /// Close a step: a failed or empty step leaves a terminal context with
    /// no stale options.
    fn finish_step(&mut self, running: bool) -> bool {
        if !running {
            self.clear_options();
            tracing::debug!(active_node = ?self.active_node, "Dialogue reached a terminal node");
        }
        running
    }

    // =========================================================================
    // Side effects
    // =========================================================================

    fn fire_enter_events(&self, node: &Node) {
        for event in node.enter_events() {
            let name = event.resolved_participant_name(node.participant_name());
            let participant = self.participant(name);
            if participant.is_none() {
                tracing::debug!(
                    participant = name,
                    event = %event.event_name,
                    "Event target participant not registered, skipping"
                );
            }
            event.dispatch(participant);
        }
    }

    fn record_visit(&mut self, node_index: usize) {
        let Ok(index) = i32::try_from(node_index) else {
            return;
        };
        self.visited_nodes.insert(index);
        self.memory.mark_visited(self.instance_id, index);
    }

    fn reset_playthrough(&mut self) {
        self.state = ContextState::Idle;
        self.active_node = None;
        self.options.clear();
        self.all_options.clear();
        self.visited_nodes.clear();
        self.sequence_cursors.clear();
    }

    fn warn_missing_participants(&self) {
        for name in self.dialogue.associated_participants() {
            if !self.participants.contains_key(&name) {
                tracing::warn!(
                    dialogue = %self.dialogue.name(),
                    participant = %name,
                    "Dialogue references a participant that is not registered"
                );
            }
        }
    }

    fn validate_node_index(&self, node_index: usize) -> Result<usize, DialogueError> {
        if self.dialogue.node_count() == 0 {
            return Err(DialogueError::EmptyDialogue(self.dialogue.name().to_string()));
        }
        if node_index >= self.dialogue.node_count() {
            return Err(DialogueError::invalid_node(
                node_index as i64,
                self.dialogue.node_count(),
            ));
        }
        Ok(node_index)
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    pub fn dialogue(&self) -> &Dialogue {
        &self.dialogue
    }

    pub fn instance_id(&self) -> DialogueId {
        self.instance_id
    }

    pub fn memory(&self) -> &DialogueMemory {
        &self.memory
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn has_ended(&self) -> bool {
        self.state == ContextState::Terminal
    }

    pub fn active_node_index(&self) -> Option<usize> {
        self.active_node
    }

    pub fn active_node(&self) -> Option<&Node> {
        self.active_node.and_then(|index| self.dialogue.node(index))
    }

    pub fn participant(&self, name: &str) -> Option<&dyn Participant> {
        self.participants.get(name).map(|participant| participant.as_ref())
    }

    /// Line of the active node; empty for logic nodes.
    pub fn active_node_text(&self) -> &str {
        let Some((index, node)) = self.active_entry() else {
            return "";
        };
        match node.kind() {
            NodeKind::Speech(speech) => speech.text.as_str(),
            NodeKind::SpeechSequence(sequence) => sequence.text_at(self.sequence_cursor(index)),
            _ => "",
        }
    }

    pub fn active_node_voice(&self) -> Option<&str> {
        let (index, node) = self.active_entry()?;
        match node.kind() {
            NodeKind::Speech(speech) => speech.voice.as_deref(),
            NodeKind::SpeechSequence(sequence) => sequence.voice_at(self.sequence_cursor(index)),
            _ => None,
        }
    }

    /// Speaker of the active line: the sequence entry's speaker when there is
    /// one, otherwise the node's participant.
    pub fn active_participant_name(&self) -> &str {
        let Some((index, node)) = self.active_entry() else {
            return "";
        };
        if let NodeKind::SpeechSequence(sequence) = node.kind() {
            let speaker = sequence.speaker_at(self.sequence_cursor(index));
            if !speaker.is_empty() {
                return speaker;
            }
        }
        node.participant_name()
    }

    pub fn active_participant(&self) -> Option<&dyn Participant> {
        self.participant(self.active_participant_name())
    }

    /// Satisfied options, in authored order.
    pub fn options(&self) -> &[Edge] {
        &self.options
    }

    /// Every targeted option of the active node, satisfied or not.
    pub fn all_options(&self) -> &[DialogueOption] {
        &self.all_options
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    pub fn option_text(&self, option_index: usize) -> Option<&str> {
        self.options.get(option_index).map(|edge| edge.text.as_str())
    }

    fn option_target(&self, option_index: usize) -> Option<usize> {
        self.options
            .get(option_index)?
            .target_within(self.dialogue.node_count())
    }

    /// Whether the option leads to a node visited in this playthrough, or in
    /// any earlier one when `long_term` is set.
    pub fn is_option_connected_to_visited_node(&self, option_index: usize, long_term: bool) -> bool {
        self.option_target(option_index)
            .and_then(|target| i32::try_from(target).ok())
            .is_some_and(|target| self.was_node_visited(target, long_term))
    }

    pub fn is_option_connected_to_end_node(&self, option_index: usize) -> bool {
        self.option_target(option_index)
            .and_then(|target| self.dialogue.node(target))
            .is_some_and(Node::is_end)
    }

    pub fn visited_nodes(&self) -> &BTreeSet<i32> {
        &self.visited_nodes
    }

    pub fn was_node_visited(&self, node_index: i32, long_term: bool) -> bool {
        if long_term {
            self.memory.is_visited(self.instance_id, node_index)
        } else {
            self.visited_nodes.contains(&node_index)
        }
    }

    fn active_entry(&self) -> Option<(usize, &Node)> {
        let index = self.active_node?;
        Some((index, self.dialogue.node(index)?))
    }
}
