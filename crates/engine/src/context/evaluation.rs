//! Condition checks on edges and nodes.
//!
//! `already_evaluated` holds the nodes whose children are currently being
//! expanded. A node met again while it is on that path fails, which keeps
//! cyclic graphs finite; the set is restored on the way back up so sibling
//! branches see the same path.
//!
//! Shared descendants are walked again through every route that reaches
//! them, so each top-level check also carries a budget of edge evaluations.
//! Running out fails the rest of the check closed.

use std::collections::HashSet;

use dlgflow_domain::{Condition, Edge, Node, VisitQuery};

use super::DialogueContext;
use crate::infrastructure::config::ChildEvaluationPolicy;

/// State of one top-level condition check.
struct Walk<'a> {
    path: &'a mut HashSet<usize>,
    steps: usize,
}

impl<'a> Walk<'a> {
    fn new(path: &'a mut HashSet<usize>) -> Self {
        Self { path, steps: 0 }
    }

    /// Count one edge evaluation. False once the budget is spent.
    fn step(&mut self, max_steps: usize) -> bool {
        self.steps += 1;
        if self.steps <= max_steps {
            return true;
        }
        if self.steps == max_steps + 1 {
            tracing::warn!(
                max_evaluation_steps = max_steps,
                "Condition check exceeded its step budget, treating the rest as unsatisfied"
            );
        }
        false
    }
}

impl DialogueContext {
    /// An edge passes when it has a target inside the dialogue, its own
    /// conditions pass and the target node may be entered.
    ///
    /// Edge conditions have no owning participant; they must name theirs.
    pub fn evaluate_edge(&self, edge: &Edge, already_evaluated: &mut HashSet<usize>) -> bool {
        self.edge_passes(edge, &mut Walk::new(already_evaluated))
    }

    /// Whether `node_index` may be entered right now.
    ///
    /// Besides the node's own enter conditions, children are consulted when
    /// the node asks for it (`check_children_on_evaluation`, combined per the
    /// configured policy) and always for nodes that advance on their own,
    /// which are useless without a satisfied child.
    pub fn check_node_enter_conditions(
        &self,
        node_index: usize,
        already_evaluated: &mut HashSet<usize>,
    ) -> bool {
        self.node_enterable(node_index, &mut Walk::new(already_evaluated))
    }

    fn edge_passes(&self, edge: &Edge, walk: &mut Walk<'_>) -> bool {
        if !walk.step(self.config.max_evaluation_steps) {
            return false;
        }
        let Some(target) = edge.target_within(self.dialogue.node_count()) else {
            return false;
        };

        self.evaluate_conditions(&edge.conditions, "") && self.node_enterable(target, walk)
    }

    fn node_enterable(&self, node_index: usize, walk: &mut Walk<'_>) -> bool {
        if walk.path.contains(&node_index) {
            tracing::trace!(node_index, "Node already on the evaluation path");
            return false;
        }
        let Some(node) = self.dialogue.node(node_index) else {
            return false;
        };

        let own = || self.evaluate_conditions(node.enter_conditions(), node.participant_name());

        if node.kind().auto_advances() {
            return own() && self.has_satisfied_child(node_index, node, false, walk);
        }
        if !node.check_children_on_evaluation() {
            return own();
        }

        match self.config.child_policy {
            ChildEvaluationPolicy::All => {
                own() && self.has_satisfied_child(node_index, node, true, walk)
            }
            ChildEvaluationPolicy::Any => {
                own() || self.has_satisfied_child(node_index, node, true, walk)
            }
            ChildEvaluationPolicy::ChildrenOnly => {
                self.has_satisfied_child(node_index, node, true, walk)
            }
        }
    }

    /// `empty_passes` decides the outcome for a node without any targeted
    /// child.
    fn has_satisfied_child(
        &self,
        node_index: usize,
        node: &Node,
        empty_passes: bool,
        walk: &mut Walk<'_>,
    ) -> bool {
        let node_count = self.dialogue.node_count();
        let mut targeted = node
            .children()
            .iter()
            .filter(|edge| edge.target_within(node_count).is_some())
            .peekable();

        if targeted.peek().is_none() {
            return empty_passes;
        }
        if walk.path.len() >= self.config.max_evaluation_depth {
            tracing::warn!(
                node_index,
                max_evaluation_depth = self.config.max_evaluation_depth,
                "Condition check too deep, treating children as unsatisfied"
            );
            return false;
        }

        walk.path.insert(node_index);
        let satisfied = targeted.any(|edge| self.edge_passes(edge, walk));
        walk.path.remove(&node_index);
        satisfied
    }

    /// Evaluate a condition array, resolving each condition's participant
    /// against the registered ones. An empty participant name falls back to
    /// `default_participant`.
    pub(crate) fn evaluate_conditions(&self, conditions: &[Condition], default_participant: &str) -> bool {
        Condition::evaluate_all(conditions, |condition| {
            let name = condition.resolved_participant_name(default_participant);
            let participant = self.participant(name);
            if participant.is_none() && condition.kind.requires_participant() {
                tracing::debug!(
                    participant = name,
                    callback = %condition.callback_name,
                    "Condition participant not registered, condition fails"
                );
            }
            condition.evaluate(participant, self)
        })
    }
}

impl VisitQuery for DialogueContext {
    fn was_node_visited(&self, node_index: i32, long_term: bool) -> bool {
        DialogueContext::was_node_visited(self, node_index, long_term)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dlgflow_domain::{ComparisonOperation, Dialogue, Node, SelectorKind};

    use super::*;
    use crate::infrastructure::config::EngineConfig;
    use crate::stores::DialogueMemory;
    use crate::test_fixtures::TestParticipant;

    fn context_for(dialogue: Dialogue) -> DialogueContext {
        DialogueContext::new(Arc::new(dialogue), Arc::new(DialogueMemory::new()))
    }

    mod edges {
        use super::*;

        #[test]
        fn unconnected_and_dangling_edges_fail() {
            let context = context_for(Dialogue::new("Tiny").with_node(Node::speech("A", "Hi")));

            assert!(!context.evaluate_edge(&Edge::unconnected(), &mut HashSet::new()));
            assert!(!context.evaluate_edge(&Edge::new(5), &mut HashSet::new()));
            assert!(context.evaluate_edge(&Edge::new(0), &mut HashSet::new()));
        }

        #[test]
        fn edge_conditions_gate_the_target() {
            let guard = Arc::new(TestParticipant::new().with_int("trust", 1));
            let context = context_for(Dialogue::new("Gate").with_node(Node::speech("Guard", "Pass")))
                .with_participant("Guard", guard.clone());

            let edge = Edge::new(0).with_condition(Condition::int_call(
                "Guard",
                "trust",
                ComparisonOperation::GreaterOrEqual,
                2,
            ));
            assert!(!context.evaluate_edge(&edge, &mut HashSet::new()));

            guard.set_int("trust", 2);
            assert!(context.evaluate_edge(&edge, &mut HashSet::new()));
        }

        #[test]
        fn weak_conditions_need_one_pass() {
            let player = TestParticipant::new()
                .with_condition("has_key", false)
                .with_name("class", "Thief");
            let context = context_for(Dialogue::new("Door").with_node(Node::speech("Door", "Locked")))
                .with_participant("Player", Arc::new(player));

            let edge = Edge::new(0)
                .with_condition(Condition::event_call("Player", "has_key", true).weak())
                .with_condition(
                    Condition::name_call("Player", "class", ComparisonOperation::Equal, "Thief").weak(),
                );
            assert!(context.evaluate_edge(&edge, &mut HashSet::new()));

            let strict = edge.with_condition(Condition::event_call("Player", "has_key", true));
            assert!(!context.evaluate_edge(&strict, &mut HashSet::new()));
        }

        #[test]
        fn edge_conditions_without_participant_fail() {
            let context = context_for(Dialogue::new("Gate").with_node(Node::speech("Guard", "Pass")))
                .with_participant("Guard", Arc::new(TestParticipant::new().with_bool("open", true)));

            let edge = Edge::new(0).with_condition(Condition::bool_call("", "open", true));
            assert!(!context.evaluate_edge(&edge, &mut HashSet::new()));
        }
    }

    mod nodes {
        use super::*;

        #[test]
        fn enter_conditions_default_to_node_participant() {
            let dialogue = Dialogue::new("Shop").with_node(
                Node::speech("Merchant", "Welcome")
                    .with_enter_condition(Condition::bool_call("", "open", true)),
            );
            let context = context_for(dialogue)
                .with_participant("Merchant", Arc::new(TestParticipant::new().with_bool("open", true)));

            assert!(context.check_node_enter_conditions(0, &mut HashSet::new()));
        }

        #[test]
        fn node_on_the_path_fails() {
            let context = context_for(Dialogue::new("Loop").with_node(Node::speech("A", "Hi")));
            let mut path = HashSet::from([0]);
            assert!(!context.check_node_enter_conditions(0, &mut path));
        }

        #[test]
        fn cycle_with_child_checks_terminates() {
            let dialogue = Dialogue::new("Loop")
                .with_node(
                    Node::speech("A", "one")
                        .with_check_children_on_evaluation(true)
                        .with_child(Edge::new(1)),
                )
                .with_node(
                    Node::speech("A", "two")
                        .with_check_children_on_evaluation(true)
                        .with_child(Edge::new(0)),
                );
            let context = context_for(dialogue);

            let mut path = HashSet::new();
            assert!(!context.check_node_enter_conditions(0, &mut path));
            assert!(path.is_empty());
        }

        #[test]
        fn childless_node_with_child_checks_passes() {
            let dialogue = Dialogue::new("Leaf").with_node(
                Node::speech("A", "bye")
                    .with_check_children_on_evaluation(true)
                    .with_child(Edge::unconnected()),
            );
            assert!(context_for(dialogue).check_node_enter_conditions(0, &mut HashSet::new()));
        }

        #[test]
        fn selector_without_satisfied_child_fails() {
            let dialogue = Dialogue::new("Pick")
                .with_node(Node::selector(SelectorKind::First).with_child(Edge::new(1)))
                .with_node(
                    Node::speech("A", "locked")
                        .with_enter_condition(Condition::was_node_visited(0, true, false)),
                );
            assert!(!context_for(dialogue).check_node_enter_conditions(0, &mut HashSet::new()));
        }

        #[test]
        fn evaluation_depth_limit_fails_closed() {
            let dialogue = Dialogue::new("Chain")
                .with_node(
                    Node::speech("A", "0")
                        .with_check_children_on_evaluation(true)
                        .with_child(Edge::new(1)),
                )
                .with_node(
                    Node::speech("A", "1")
                        .with_check_children_on_evaluation(true)
                        .with_child(Edge::new(2)),
                )
                .with_node(Node::speech("A", "2"));

            let shallow = context_for(dialogue.clone())
                .with_config(EngineConfig::default().with_max_evaluation_depth(1));
            assert!(!shallow.check_node_enter_conditions(0, &mut HashSet::new()));

            let deep = context_for(dialogue);
            assert!(deep.check_node_enter_conditions(0, &mut HashSet::new()));
        }

        #[test]
        fn step_budget_counts_every_edge() {
            let dialogue = Dialogue::new("Chain")
                .with_node(
                    Node::speech("A", "0")
                        .with_check_children_on_evaluation(true)
                        .with_child(Edge::new(1)),
                )
                .with_node(
                    Node::speech("A", "1")
                        .with_check_children_on_evaluation(true)
                        .with_child(Edge::new(2)),
                )
                .with_node(Node::speech("A", "2"));

            let enough = context_for(dialogue.clone())
                .with_config(EngineConfig::default().with_max_evaluation_steps(2));
            assert!(enough.check_node_enter_conditions(0, &mut HashSet::new()));

            let starved = context_for(dialogue)
                .with_config(EngineConfig::default().with_max_evaluation_steps(1));
            let mut path = HashSet::new();
            assert!(!starved.check_node_enter_conditions(0, &mut path));
            assert!(path.is_empty());
        }

        #[test]
        fn each_top_level_check_gets_a_fresh_budget() {
            let dialogue = Dialogue::new("Pair")
                .with_node(Node::speech("A", "0"))
                .with_node(Node::speech("A", "1"));
            let context = context_for(dialogue)
                .with_config(EngineConfig::default().with_max_evaluation_steps(1));

            let mut path = HashSet::new();
            assert!(context.evaluate_edge(&Edge::new(0), &mut path));
            assert!(context.evaluate_edge(&Edge::new(1), &mut path));
        }
    }

    mod policies {
        use super::*;

        /// Node 0 fails its own condition but has a passing child.
        fn own_fails_child_passes() -> Dialogue {
            Dialogue::new("Policy")
                .with_node(
                    Node::speech("A", "gated")
                        .with_check_children_on_evaluation(true)
                        .with_enter_condition(Condition::was_node_visited(1, true, false))
                        .with_child(Edge::new(1)),
                )
                .with_node(Node::speech("A", "open"))
        }

        fn check(policy: ChildEvaluationPolicy) -> bool {
            context_for(own_fails_child_passes())
                .with_config(EngineConfig::default().with_child_policy(policy))
                .check_node_enter_conditions(0, &mut HashSet::new())
        }

        #[test]
        fn all_requires_own_conditions() {
            assert!(!check(ChildEvaluationPolicy::All));
        }

        #[test]
        fn any_accepts_a_child() {
            assert!(check(ChildEvaluationPolicy::Any));
        }

        #[test]
        fn children_only_ignores_own_conditions() {
            assert!(check(ChildEvaluationPolicy::ChildrenOnly));
        }
    }
}
