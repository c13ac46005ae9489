//! Solution objects: partial solutions, scenarios, and strategies
//!
//! A [`Transitions`] map is the common currency of the enumerators and the
//! evaluator. It fixes the successor of individual inner nodes and/or the
//! action of whole information sets. Keys are kept sorted so that two maps
//! with the same content compare and hash equal regardless of insertion order.

use std::collections::BTreeMap;

use crate::arena::Arena;
use crate::error::{ContractViolation, Result};
use crate::identity::Action;
use crate::node::{InfosetId, Node, NodeId};
use crate::value::Probability;

/// A single committed choice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Choice {
    /// An inner node moves to one of its successors
    Successor { node: NodeId, successor: NodeId },
    /// All nodes of an information set take the same action
    Action { infoset: InfosetId, action: Action },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Transitions {
    nodes: BTreeMap<NodeId, NodeId>,
    infosets: BTreeMap<InfosetId, Action>,
}

impl Transitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.infosets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len() + self.infosets.len()
    }

    /// Successor fixed directly for `node`
    pub fn successor(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).copied()
    }

    /// Action fixed for information set `ins`
    pub fn action(&self, ins: InfosetId) -> Option<&Action> {
        self.infosets.get(&ins)
    }

    pub fn node_choices(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes.iter().map(|(&n, &s)| (n, s))
    }

    pub fn infoset_choices(&self) -> impl Iterator<Item = (InfosetId, &Action)> + '_ {
        self.infosets.iter().map(|(&i, a)| (i, a))
    }

    pub fn set_successor(&mut self, node: NodeId, successor: NodeId) -> Option<NodeId> {
        self.nodes.insert(node, successor)
    }

    pub fn set_action(&mut self, ins: InfosetId, action: Action) -> Option<Action> {
        self.infosets.insert(ins, action)
    }

    pub fn with_action(mut self, ins: InfosetId, action: Action) -> Self {
        self.set_action(ins, action);
        self
    }

    /// Record `choice`. In consistent mode an existing, different value for
    /// the same key is a conflict: nothing is changed and false is returned.
    /// Otherwise the new value overwrites.
    pub fn assign(&mut self, choice: Choice, consistent: bool) -> bool {
        match choice {
            Choice::Successor { node, successor } => match self.nodes.get(&node) {
                Some(&existing) if consistent && existing != successor => false,
                _ => {
                    self.nodes.insert(node, successor);
                    true
                }
            },
            Choice::Action { infoset, action } => match self.infosets.get(&infoset) {
                Some(existing) if consistent && *existing != action => false,
                _ => {
                    self.infosets.insert(infoset, action);
                    true
                }
            },
        }
    }

    /// Add all entries of `other` until the first conflicting key.
    /// Returns whether no conflict was found.
    pub fn merge_consistently(&mut self, other: &Transitions) -> bool {
        for (&node, &successor) in &other.nodes {
            if !self.assign(Choice::Successor { node, successor }, true) {
                return false;
            }
        }
        for (&infoset, action) in &other.infosets {
            if !self.assign(
                Choice::Action {
                    infoset,
                    action: action.clone(),
                },
                true,
            ) {
                return false;
            }
        }
        true
    }

    /// Add all entries of `other`, later values winning.
    pub fn overwrite_with(&mut self, other: &Transitions) {
        self.nodes.extend(other.nodes.iter().map(|(&n, &s)| (n, s)));
        self.infosets
            .extend(other.infosets.iter().map(|(&i, a)| (i, a.clone())));
    }

    /// Whether every entry of `self` also appears in `other`
    pub fn is_subset_of(&self, other: &Transitions) -> bool {
        self.nodes.iter().all(|(n, s)| other.nodes.get(n) == Some(s))
            && self.infosets.iter().all(|(i, a)| other.infosets.get(i) == Some(a))
    }

    /// Union of two assignments that must not share any key.
    pub fn disjoint_union<P: Probability>(
        &self,
        other: &Transitions,
        arena: &Arena<P>,
    ) -> Result<Transitions> {
        for node in other.nodes.keys() {
            if self.nodes.contains_key(node) {
                return Err(ContractViolation::OverlappingNode(arena.label(*node)).into());
            }
        }
        for ins in other.infosets.keys() {
            if self.infosets.contains_key(ins) {
                let name = arena
                    .information_set(*ins)
                    .map(|s| s.name().to_string())
                    .unwrap_or_else(|| format!("#{ins}"));
                return Err(ContractViolation::OverlappingInformationSet(name).into());
            }
        }
        let mut union = self.clone();
        union.overwrite_with(other);
        Ok(union)
    }

    /// Check every entry against the arena: node entries must name an actual
    /// successor, information-set entries a feasible action.
    pub fn validate<P: Probability>(&self, arena: &Arena<P>) -> Result<()> {
        for (&node, &successor) in &self.nodes {
            let n = arena.node(node)?;
            if n.is_leaf() {
                return Err(ContractViolation::LeafTransition(arena.label(node)).into());
            }
            if !n.children().contains(&successor) {
                return Err(ContractViolation::NotASuccessor {
                    node: arena.label(node),
                    successor,
                }
                .into());
            }
        }
        for (&ins, action) in &self.infosets {
            let set = arena.infoset(ins)?;
            if !set.has_action(action) {
                return Err(ContractViolation::UnknownAction {
                    infoset: set.name().to_string(),
                    action: action.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// A validated set of committed choices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartialSolution {
    transitions: Transitions,
}

impl PartialSolution {
    pub fn new<P: Probability>(arena: &Arena<P>, transitions: Transitions) -> Result<Self> {
        transitions.validate(arena)?;
        Ok(PartialSolution { transitions })
    }

    /// Wrap enumerator output, which is feasible by construction
    pub(crate) fn from_transitions(transitions: Transitions) -> Self {
        PartialSolution { transitions }
    }

    pub fn transitions(&self) -> &Transitions {
        &self.transitions
    }

    pub fn into_transitions(self) -> Transitions {
        self.transitions
    }
}

/// Assumed choices of nature and of the players outside a group of interest,
/// anchored at the node evaluation proceeds from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scenario {
    current_node: NodeId,
    transitions: Transitions,
}

impl Scenario {
    pub fn new<P: Probability>(
        arena: &Arena<P>,
        current_node: NodeId,
        transitions: Transitions,
    ) -> Result<Self> {
        arena.node(current_node)?;
        transitions.validate(arena)?;
        Ok(Scenario {
            current_node,
            transitions,
        })
    }

    pub(crate) fn anchored(current_node: NodeId, transitions: Transitions) -> Self {
        Scenario {
            current_node,
            transitions,
        }
    }

    /// A scenario fixing nothing, anchored at `node`
    pub fn empty_at(node: NodeId) -> Self {
        Scenario {
            current_node: node,
            transitions: Transitions::new(),
        }
    }

    pub fn current_node(&self) -> NodeId {
        self.current_node
    }

    pub fn transitions(&self) -> &Transitions {
        &self.transitions
    }

    /// The same assumptions, re-anchored where `action` leads from the
    /// current (decision) node.
    pub fn sub_scenario<P: Probability>(&self, arena: &Arena<P>, action: &Action) -> Result<Scenario> {
        let node = arena.node(self.current_node)?;
        match node {
            Node::Decision { infoset, .. } => {
                let next = node.consequence(action).ok_or_else(|| {
                    let name = arena
                        .information_set(*infoset)
                        .map(|s| s.name().to_string())
                        .unwrap_or_default();
                    ContractViolation::UnknownAction {
                        infoset: name,
                        action: action.to_string(),
                    }
                })?;
                Ok(Scenario {
                    current_node: next,
                    transitions: self.transitions.clone(),
                })
            }
            other => Err(ContractViolation::NotADecisionNode(other.name().to_string()).into()),
        }
    }
}

/// Committed choices of a group of interest, one action per information set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Strategy {
    choices: BTreeMap<InfosetId, Action>,
    start: Option<InfosetId>,
}

impl Strategy {
    pub fn new<P: Probability>(
        arena: &Arena<P>,
        choices: BTreeMap<InfosetId, Action>,
        start: Option<InfosetId>,
    ) -> Result<Self> {
        for (&ins, action) in &choices {
            let set = arena.infoset(ins)?;
            if !set.has_action(action) {
                return Err(ContractViolation::UnknownAction {
                    infoset: set.name().to_string(),
                    action: action.to_string(),
                }
                .into());
            }
        }
        if let Some(ins) = start {
            arena.infoset(ins)?;
        }
        Ok(Strategy { choices, start })
    }

    /// The strategy committing to nothing
    pub fn empty() -> Self {
        Strategy {
            choices: BTreeMap::new(),
            start: None,
        }
    }

    /// Build from enumerator output, which is feasible by construction
    pub(crate) fn from_transitions(transitions: Transitions, start: Option<InfosetId>) -> Self {
        Strategy {
            choices: transitions.infosets,
            start,
        }
    }

    pub fn choices(&self) -> &BTreeMap<InfosetId, Action> {
        &self.choices
    }

    pub fn choice(&self, ins: InfosetId) -> Option<&Action> {
        self.choices.get(&ins)
    }

    pub fn start(&self) -> Option<InfosetId> {
        self.start
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Whether the given choices are part of this strategy
    pub fn includes(&self, choices: &BTreeMap<InfosetId, Action>) -> bool {
        choices.iter().all(|(i, a)| self.choices.get(i) == Some(a))
    }

    pub fn to_transitions(&self) -> Transitions {
        Transitions {
            nodes: BTreeMap::new(),
            infosets: self.choices.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::identity::{actions, Outcome, Player};
    use crate::value::Rational;

    fn arena() -> (Arena<Rational>, NodeId, InfosetId) {
        let mut arena = Arena::new();
        let [a, b] = actions(["a", "b"]);
        let w1 = arena.add_outcome_node("w1", Outcome::acceptable("ok"));
        let w2 = arena.add_outcome_node("w2", Outcome::unacceptable("bad"));
        let v = arena
            .add_decision_node("v", Player::new("i"), None, vec![(a, w1), (b, w2)])
            .unwrap();
        let ins = arena.get(v).unwrap().infoset().unwrap();
        (arena, v, ins)
    }

    #[test]
    fn test_consistent_assign_detects_conflict() {
        let [a, b] = actions(["a", "b"]);
        let mut t = Transitions::new();
        assert!(t.assign(Choice::Action { infoset: 0, action: a.clone() }, true));
        assert!(t.assign(Choice::Action { infoset: 0, action: a.clone() }, true));
        assert!(!t.assign(Choice::Action { infoset: 0, action: b.clone() }, true));
        assert_eq!(t.action(0), Some(&a));
        assert!(t.assign(Choice::Action { infoset: 0, action: b.clone() }, false));
        assert_eq!(t.action(0), Some(&b));
    }

    #[test]
    fn test_equal_content_hashes_equal() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let [a, b] = actions(["a", "b"]);
        let t1 = Transitions::new().with_action(1, a.clone()).with_action(2, b.clone());
        let t2 = Transitions::new().with_action(2, b).with_action(1, a);
        let hash = |t: &Transitions| {
            let mut h = DefaultHasher::new();
            t.hash(&mut h);
            h.finish()
        };
        assert_eq!(t1, t2);
        assert_eq!(hash(&t1), hash(&t2));
    }

    #[test]
    fn test_disjoint_union_rejects_overlap() {
        let (arena, _, ins) = arena();
        let [a, b] = actions(["a", "b"]);
        let scenario = Transitions::new().with_action(ins, a);
        let strategy = Transitions::new().with_action(ins, b);
        let err = scenario.disjoint_union(&strategy, &arena).unwrap_err();
        assert!(matches!(
            err,
            Error::Contract(ContractViolation::OverlappingInformationSet(_))
        ));
        assert!(scenario.disjoint_union(&Transitions::new(), &arena).is_ok());
    }

    #[test]
    fn test_validation_rejects_infeasible_choices() {
        let (arena, v, ins) = arena();
        let mut bogus = Transitions::new();
        bogus.set_successor(v, v);
        assert!(PartialSolution::new(&arena, bogus).is_err());

        let choices = BTreeMap::from([(ins, Action::new("z"))]);
        let err = Strategy::new(&arena, choices, None).unwrap_err();
        assert!(matches!(err, Error::Contract(ContractViolation::UnknownAction { .. })));
    }

    #[test]
    fn test_sub_scenario_moves_anchor() {
        let (arena, v, _) = arena();
        let scenario = Scenario::empty_at(v);
        let sub = scenario.sub_scenario(&arena, &Action::new("b")).unwrap();
        assert_eq!(arena.get(sub.current_node()).unwrap().name(), "w2");
        assert!(sub.sub_scenario(&arena, &Action::new("b")).is_err());
    }

    #[test]
    fn test_strategy_includes() {
        let (arena, _, ins) = arena();
        let choice = BTreeMap::from([(ins, Action::new("a"))]);
        let strategy = Strategy::new(&arena, choice.clone(), Some(ins)).unwrap();
        assert!(strategy.includes(&choice));
        assert!(strategy.includes(&BTreeMap::new()));
        assert!(!strategy.includes(&BTreeMap::from([(ins, Action::new("b"))])));
        assert_eq!(strategy.to_transitions().action(ins), Some(&Action::new("a")));
    }
}
