//! Arena storage for decision trees
//!
//! Nodes are built leaves first: a successor must exist and be unowned
//! before an inner node can adopt it. Every constructor validates the new node
//! immediately and leaves the arena untouched on failure. Removal (used by the
//! trust-based reduction) empties the node's slot, so IDs are never reused.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::error::{ContractViolation, Result, StructuralViolation};
use crate::identity::{Action, Outcome, Player};
use crate::infoset::{join_actions, same_action_set, InformationSet};
use crate::node::{InfosetId, Node, NodeId};
use crate::value::Probability;

/// Flat storage of nodes and information sets, indexed by ID.
#[derive(Debug, Clone)]
pub struct Arena<P> {
    /// Node slots indexed by NodeId; None once a node is removed
    nodes: Vec<Option<Node<P>>>,
    /// Information sets indexed by InfosetId
    infosets: Vec<InformationSet>,
    /// Outcome nodes referencing each outcome, in attachment order
    outcome_nodes: BTreeMap<Outcome, Vec<NodeId>>,
}

impl<P> Default for Arena<P> {
    fn default() -> Self {
        Arena {
            nodes: Vec::new(),
            infosets: Vec::new(),
            outcome_nodes: BTreeMap::new(),
        }
    }
}

/// Per-variant payload check, independent of the rest of the arena.
pub fn validate_payload<P: Probability>(node: &Node<P>) -> std::result::Result<(), StructuralViolation> {
    let children = node.children();
    for (k, child) in children.iter().enumerate() {
        if children[..k].contains(child) {
            return Err(StructuralViolation::DuplicateSuccessor {
                parent: node.name().to_string(),
                child: *child,
            });
        }
    }
    match node {
        Node::Outcome { .. } => Ok(()),
        Node::Possibility { name, children, .. } => {
            if children.is_empty() {
                return Err(StructuralViolation::NoSuccessors(name.clone()));
            }
            Ok(())
        }
        Node::Probability {
            name,
            children,
            probabilities,
            ..
        } => {
            if children.is_empty() {
                return Err(StructuralViolation::NoSuccessors(name.clone()));
            }
            let mut total = P::zero();
            for p in probabilities {
                if *p < P::zero() {
                    return Err(StructuralViolation::NegativeProbability {
                        node: name.clone(),
                        value: p.to_string(),
                    });
                }
                total = match total.checked_add(p) {
                    Some(total) => total,
                    None => {
                        return Err(StructuralViolation::ProbabilitySum {
                            node: name.clone(),
                            total: format!("{total} + {p}, beyond exact range"),
                        })
                    }
                };
            }
            let total = total.simplify();
            if total != P::one() {
                return Err(StructuralViolation::ProbabilitySum {
                    node: name.clone(),
                    total: total.to_string(),
                });
            }
            Ok(())
        }
        Node::Decision { name, actions, .. } => {
            if actions.is_empty() {
                return Err(StructuralViolation::NoActions(name.clone()));
            }
            for (k, action) in actions.iter().enumerate() {
                if actions[..k].contains(action) {
                    return Err(StructuralViolation::DuplicateAction {
                        node: name.clone(),
                        action: action.to_string(),
                    });
                }
            }
            Ok(())
        }
    }
}

impl<P: Probability> Arena<P> {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a node by ID (None if unknown or removed)
    pub fn get(&self, id: NodeId) -> Option<&Node<P>> {
        self.nodes.get(id as usize).and_then(Option::as_ref)
    }

    /// Get a node by ID, failing with a contract violation if absent
    pub fn node(&self, id: NodeId) -> Result<&Node<P>> {
        self.get(id)
            .ok_or_else(|| ContractViolation::UnknownNode(id).into())
    }

    /// Display name of a node, falling back to its ID
    pub fn label(&self, id: NodeId) -> String {
        match self.get(id) {
            Some(node) if node.is_named() => node.name().to_string(),
            _ => format!("#{id}"),
        }
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live nodes in ID order
    pub fn iter(&self) -> impl Iterator<Item = &Node<P>> {
        self.nodes.iter().flatten()
    }

    pub fn information_set(&self, id: InfosetId) -> Option<&InformationSet> {
        self.infosets.get(id as usize)
    }

    /// Get an information set by ID, failing with a contract violation if absent
    pub fn infoset(&self, id: InfosetId) -> Result<&InformationSet> {
        self.information_set(id)
            .ok_or_else(|| ContractViolation::UnknownInformationSet(id).into())
    }

    /// Information sets that still have members
    pub fn information_sets(&self) -> impl Iterator<Item = &InformationSet> {
        self.infosets.iter().filter(|ins| !ins.nodes.is_empty())
    }

    /// Outcome nodes currently referencing `outcome`
    pub fn outcome_nodes_of(&self, outcome: &Outcome) -> &[NodeId] {
        self.outcome_nodes
            .get(outcome)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Outcomes referenced by at least one live node
    pub fn outcomes(&self) -> impl Iterator<Item = &Outcome> {
        self.outcome_nodes.keys()
    }

    /// Create an empty information set; its player and actions are fixed
    /// by the first decision node added to it.
    pub fn add_information_set(&mut self, name: impl Into<String>) -> InfosetId {
        let id = self.infosets.len() as InfosetId;
        self.infosets.push(InformationSet::new(id, name));
        id
    }

    pub(crate) fn rename_information_set(&mut self, id: InfosetId, name: String) -> Result<()> {
        let ins = self
            .infosets
            .get_mut(id as usize)
            .ok_or(ContractViolation::UnknownInformationSet(id))?;
        debug!(from = %ins.name, to = %name, "renaming information set");
        ins.name = name;
        Ok(())
    }

    fn next_id(&self) -> NodeId {
        self.nodes.len() as NodeId
    }

    /// Check that `children` exist and are unowned.
    fn check_successors(&self, parent: &str, children: &[NodeId]) -> Result<()> {
        for &child in children {
            match self.get(child) {
                None => {
                    return Err(StructuralViolation::MissingSuccessor {
                        parent: parent.to_string(),
                        child,
                    }
                    .into())
                }
                Some(node) if node.parent().is_some() => {
                    return Err(StructuralViolation::AlreadyOwned {
                        parent: parent.to_string(),
                        child,
                    }
                    .into())
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Validate `node` and its successors, then store it and link the successors.
    fn insert(&mut self, node: Node<P>) -> Result<NodeId> {
        validate_payload(&node)?;
        self.check_successors(node.name(), node.children())?;
        let id = node.id();
        for &child in node.children() {
            if let Some(Some(c)) = self.nodes.get_mut(child as usize) {
                c.set_parent(Some(id));
            }
        }
        self.nodes.push(Some(node));
        Ok(id)
    }

    /// Add a leaf referencing `outcome`.
    pub fn add_outcome_node(&mut self, name: impl Into<String>, outcome: Outcome) -> NodeId {
        let id = self.next_id();
        let entry = self.outcome_nodes.entry(outcome.clone()).or_default();
        if !entry.contains(&id) {
            entry.push(id);
        }
        self.nodes.push(Some(Node::Outcome {
            id,
            name: name.into(),
            parent: None,
            outcome,
        }));
        id
    }

    /// Add a possibility node over `successors`, each with an optional edge label.
    pub fn add_possibility_node(
        &mut self,
        name: impl Into<String>,
        successors: Vec<(NodeId, Option<String>)>,
    ) -> Result<NodeId> {
        let (children, labels) = successors.into_iter().unzip();
        self.insert(Node::Possibility {
            id: self.next_id(),
            name: name.into(),
            parent: None,
            children,
            labels,
        })
    }

    /// Add a probability node; the probabilities must sum to exactly one.
    pub fn add_probability_node(
        &mut self,
        name: impl Into<String>,
        successors: Vec<(NodeId, P)>,
    ) -> Result<NodeId> {
        let (children, probabilities) = successors.into_iter().unzip();
        self.insert(Node::Probability {
            id: self.next_id(),
            name: name.into(),
            parent: None,
            children,
            probabilities,
        })
    }

    /// Add a decision node for `player`.
    ///
    /// With `infoset = None` a singleton information set is created for the
    /// node. Otherwise the node joins `infoset`, which must agree on player
    /// and action set with its existing members.
    pub fn add_decision_node(
        &mut self,
        name: impl Into<String>,
        player: Player,
        infoset: Option<InfosetId>,
        consequences: Vec<(Action, NodeId)>,
    ) -> Result<NodeId> {
        let name = name.into();
        let (actions, children): (Vec<Action>, Vec<NodeId>) = consequences.into_iter().unzip();
        let id = self.next_id();
        let node = Node::Decision {
            id,
            name: name.clone(),
            parent: None,
            player: player.clone(),
            infoset: infoset.unwrap_or(self.infosets.len() as InfosetId),
            actions: actions.clone(),
            children,
        };
        validate_payload(&node)?;
        self.check_successors(&name, node.children())?;
        let ins_id = match infoset {
            Some(ins_id) => {
                let ins = self.infoset(ins_id)?;
                check_member(ins, &name, &player, &actions)?;
                ins_id
            }
            None => self.add_information_set(format!("ins_{name}")),
        };
        let id = self.insert(node)?;
        let ins = &mut self.infosets[ins_id as usize];
        if ins.nodes.is_empty() {
            ins.player = Some(player);
            ins.actions = Some(actions);
        }
        ins.nodes.push(id);
        Ok(id)
    }

    /// Re-run the local checks of one node.
    pub fn validate_node(&self, id: NodeId) -> Result<()> {
        let node = self.node(id)?;
        validate_payload(node)?;
        for &child in node.children() {
            let c = self.get(child).ok_or_else(|| StructuralViolation::MissingSuccessor {
                parent: node.name().to_string(),
                child,
            })?;
            if c.parent() != Some(id) {
                return Err(StructuralViolation::BrokenLink {
                    child,
                    recorded: c.parent(),
                    actual: id,
                }
                .into());
            }
        }
        if let Node::Decision { infoset, .. } = node {
            let ins = self.infoset(*infoset)?;
            if !ins.contains(id) {
                return Err(StructuralViolation::StaleMember {
                    infoset: ins.name.clone(),
                    node: id,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Check that all members of an information set share one player and one action set.
    pub fn validate_information_set(&self, id: InfosetId) -> Result<()> {
        let ins = self.infoset(id)?;
        for &member in &ins.nodes {
            match self.get(member) {
                Some(Node::Decision {
                    name,
                    player,
                    infoset,
                    actions,
                    ..
                }) if *infoset == id => check_member(ins, name, player, actions)?,
                _ => {
                    return Err(StructuralViolation::StaleMember {
                        infoset: ins.name.clone(),
                        node: member,
                    }
                    .into())
                }
            }
        }
        Ok(())
    }

    /// Validate every live node and information set.
    ///
    /// Pure: safe to call any number of times, e.g. after removing actions.
    pub fn validate(&self) -> Result<()> {
        for node in self.iter() {
            self.validate_node(node.id())?;
        }
        for ins in &self.infosets {
            self.validate_information_set(ins.id)?;
        }
        Ok(())
    }

    /// Nodes from the topmost ancestor down to `id`, inclusive.
    pub fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = self.get(id).map(|_| id);
        while let Some(node_id) = current {
            path.push(node_id);
            current = self.get(node_id).and_then(Node::parent);
        }
        path.reverse();
        path
    }

    /// Nodes from the topmost ancestor down to the predecessor of `id`.
    pub fn history(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = self.path(id);
        path.pop();
        path
    }

    /// Whether `node` lies in the subtree rooted at `ancestor` (inclusive).
    pub fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        self.path(node).contains(&ancestor)
    }

    /// The subtree rooted at `id` in pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.get(current) {
                out.push(current);
                // reverse so that the first child is visited first
                stack.extend(node.children().iter().rev());
            }
        }
        out
    }

    /// Choices made by the acting player of `node` on the way from the root
    /// to `node`, excluding `node` itself.
    pub fn choice_history(&self, node: NodeId) -> Result<Vec<(InfosetId, Action)>> {
        let player = match self.node(node)? {
            Node::Decision { player, .. } => player,
            other => return Err(ContractViolation::NotADecisionNode(other.name().to_string()).into()),
        };
        let path = self.path(node);
        let mut history = Vec::new();
        for pair in path.windows(2) {
            if let Some(Node::Decision {
                player: p, infoset, ..
            }) = self.get(pair[0])
            {
                if p == player {
                    if let Some(action) = self.get(pair[0]).and_then(|n| n.action_to(pair[1])) {
                        history.push((*infoset, action.clone()));
                    }
                }
            }
        }
        Ok(history)
    }

    /// Union of the choice histories of all members of an information set.
    pub fn infoset_choice_history(&self, id: InfosetId) -> Result<Vec<(InfosetId, Action)>> {
        let ins = self.infoset(id)?;
        let mut history: Vec<(InfosetId, Action)> = Vec::new();
        for &member in &ins.nodes {
            for choice in self.choice_history(member)? {
                if !history.contains(&choice) {
                    history.push(choice);
                }
            }
        }
        Ok(history)
    }

    /// Remove `action` from an information set, deleting the successor
    /// subtree it leads to at every member node.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_action(&mut self, id: InfosetId, action: &Action) -> Result<()> {
        let ins = self.infoset(id)?;
        if !ins.has_action(action) {
            return Err(ContractViolation::UnknownAction {
                infoset: ins.name.clone(),
                action: action.to_string(),
            }
            .into());
        }
        if ins.actions().len() == 1 {
            return Err(ContractViolation::LastAction {
                infoset: ins.name.clone(),
                action: action.to_string(),
            }
            .into());
        }
        let members = ins.nodes.clone();
        if let Some(actions) = self.infosets[id as usize].actions.as_mut() {
            actions.retain(|a| a != action);
        }
        for member in members {
            let severed = match self.nodes.get_mut(member as usize) {
                Some(Some(Node::Decision {
                    actions, children, ..
                })) => match actions.iter().position(|a| a == action) {
                    Some(k) => {
                        actions.remove(k);
                        Some(children.remove(k))
                    }
                    None => None,
                },
                // member already removed as part of an earlier severed subtree
                _ => None,
            };
            if let Some(child) = severed {
                debug!(node = member, child, "severing subtree");
                self.remove_subtree(child);
            }
        }
        self.validate()
    }

    /// Detach `id` from its parent's bookkeeping and delete its whole subtree.
    ///
    /// The caller is responsible for removing `id` from the parent's successor
    /// list beforehand.
    pub(crate) fn remove_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get_mut(current as usize).and_then(Option::take) else {
                continue;
            };
            stack.extend(node.children());
            match node {
                Node::Decision { infoset, .. } => {
                    let ins = &mut self.infosets[infoset as usize];
                    ins.nodes.retain(|&n| n != current);
                    if ins.nodes.is_empty() {
                        ins.player = None;
                        ins.actions = None;
                    }
                }
                Node::Outcome { outcome, .. } => {
                    if let Some(list) = self.outcome_nodes.get_mut(&outcome) {
                        list.retain(|&n| n != current);
                        if list.is_empty() {
                            self.outcome_nodes.remove(&outcome);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

/// Check that a (prospective) member agrees with an information set.
fn check_member(
    ins: &InformationSet,
    node: &str,
    player: &Player,
    actions: &[Action],
) -> std::result::Result<(), StructuralViolation> {
    if let Some(expected) = &ins.player {
        if expected != player {
            return Err(StructuralViolation::MixedPlayers {
                infoset: ins.name.clone(),
                node: node.to_string(),
                expected: expected.to_string(),
                found: player.to_string(),
            });
        }
    }
    if let Some(expected) = &ins.actions {
        if !same_action_set(expected, actions) {
            return Err(StructuralViolation::MixedActions {
                infoset: ins.name.clone(),
                node: node.to_string(),
                expected: join_actions(expected),
                found: join_actions(actions),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::identity::actions;
    use crate::value::{ratio, Rational};

    fn leaves(arena: &mut Arena<Rational>, n: usize) -> Vec<NodeId> {
        (0..n)
            .map(|k| arena.add_outcome_node(format!("w{k}"), Outcome::new(format!("o{k}"), k % 2 == 0)))
            .collect()
    }

    #[test]
    fn test_probability_sum_must_be_one() {
        let mut arena = Arena::<Rational>::new();
        let w = leaves(&mut arena, 2);
        let err = arena
            .add_probability_node("p", vec![(w[0], ratio(4, 10)), (w[1], ratio(5, 10))])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Structure(StructuralViolation::ProbabilitySum { .. })
        ));
        // failed construction leaves successors unowned
        assert_eq!(arena.get(w[0]).unwrap().parent(), None);
        arena
            .add_probability_node("p", vec![(w[0], ratio(2, 5)), (w[1], ratio(3, 5))])
            .unwrap();
    }

    #[test]
    fn test_probability_sum_f64() {
        let mut arena = Arena::<f64>::new();
        let a = arena.add_outcome_node("a", Outcome::acceptable("ok"));
        let b = arena.add_outcome_node("b", Outcome::unacceptable("bad"));
        assert!(arena.add_probability_node("p", vec![(a, 0.3), (b, 0.6)]).is_err());
        let c = arena.add_outcome_node("c", Outcome::acceptable("ok"));
        arena
            .add_probability_node("q", vec![(a, 0.1), (b, 0.2), (c, 0.7)])
            .unwrap();
    }

    #[test]
    fn test_negative_probability_rejected() {
        let mut arena = Arena::<Rational>::new();
        let w = leaves(&mut arena, 2);
        let err = arena
            .add_probability_node("p", vec![(w[0], ratio(-1, 2)), (w[1], ratio(3, 2))])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Structure(StructuralViolation::NegativeProbability { .. })
        ));
    }

    #[test]
    fn test_successor_cannot_have_two_predecessors() {
        let mut arena = Arena::<Rational>::new();
        let w = leaves(&mut arena, 2);
        arena
            .add_possibility_node("x", vec![(w[0], None), (w[1], None)])
            .unwrap();
        let err = arena.add_possibility_node("y", vec![(w[0], None)]).unwrap_err();
        assert!(matches!(
            err,
            Error::Structure(StructuralViolation::AlreadyOwned { child: 0, .. })
        ));
    }

    #[test]
    fn test_missing_successor_and_empty_nodes() {
        let mut arena = Arena::<Rational>::new();
        assert!(matches!(
            arena.add_possibility_node("x", vec![(7, None)]).unwrap_err(),
            Error::Structure(StructuralViolation::MissingSuccessor { child: 7, .. })
        ));
        assert!(matches!(
            arena.add_possibility_node("x", vec![]).unwrap_err(),
            Error::Structure(StructuralViolation::NoSuccessors(_))
        ));
        assert!(matches!(
            arena
                .add_decision_node("d", Player::new("i"), None, vec![])
                .unwrap_err(),
            Error::Structure(StructuralViolation::NoActions(_))
        ));
    }

    #[test]
    fn test_information_set_requires_same_actions() {
        let mut arena = Arena::<Rational>::new();
        let [a, b, c] = actions(["a", "b", "c"]);
        let i = Player::new("i");
        let w = leaves(&mut arena, 4);
        let ins = arena.add_information_set("S");
        arena
            .add_decision_node("v1", i.clone(), Some(ins), vec![(a.clone(), w[0]), (b.clone(), w[1])])
            .unwrap();
        let err = arena
            .add_decision_node("v2", i.clone(), Some(ins), vec![(a.clone(), w[2]), (c, w[3])])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Structure(StructuralViolation::MixedActions { .. })
        ));
        // action order does not matter
        arena
            .add_decision_node("v2", i, Some(ins), vec![(b, w[3]), (a, w[2])])
            .unwrap();
        assert_eq!(arena.infoset(ins).unwrap().nodes().len(), 2);
    }

    #[test]
    fn test_information_set_requires_same_player() {
        let mut arena = Arena::<Rational>::new();
        let [a] = actions(["a"]);
        let w = leaves(&mut arena, 2);
        let ins = arena.add_information_set("S");
        arena
            .add_decision_node("v1", Player::new("i"), Some(ins), vec![(a.clone(), w[0])])
            .unwrap();
        let err = arena
            .add_decision_node("v2", Player::new("j"), Some(ins), vec![(a, w[1])])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Structure(StructuralViolation::MixedPlayers { .. })
        ));
    }

    #[test]
    fn test_validate_is_idempotent() {
        let mut arena = Arena::<Rational>::new();
        let [a, b] = actions(["a", "b"]);
        let w = leaves(&mut arena, 2);
        arena
            .add_decision_node("v", Player::new("i"), None, vec![(a, w[0]), (b, w[1])])
            .unwrap();
        let before = format!("{:?}", arena);
        arena.validate().unwrap();
        arena.validate().unwrap();
        assert_eq!(before, format!("{:?}", arena));
    }

    #[test]
    fn test_outcome_back_references() {
        let mut arena = Arena::<Rational>::new();
        let good = Outcome::acceptable("good");
        let w1 = arena.add_outcome_node("w1", good.clone());
        let w2 = arena.add_outcome_node("w2", good.clone());
        assert_eq!(arena.outcome_nodes_of(&good), &[w1, w2]);
        assert!(arena.outcome_nodes_of(&Outcome::unacceptable("bad")).is_empty());
    }

    #[test]
    fn test_remove_action_severs_subtrees() {
        let mut arena = Arena::<Rational>::new();
        let [a, b] = actions(["a", "b"]);
        let i = Player::new("i");
        let bad = Outcome::unacceptable("bad");
        let good = Outcome::acceptable("good");
        let ins = arena.add_information_set("S");
        let w1 = arena.add_outcome_node("w1", good.clone());
        let w2 = arena.add_outcome_node("w2", bad.clone());
        let w3 = arena.add_outcome_node("w3", good.clone());
        let w4 = arena.add_outcome_node("w4", bad.clone());
        let v1 = arena
            .add_decision_node("v1", i.clone(), Some(ins), vec![(a.clone(), w1), (b.clone(), w2)])
            .unwrap();
        let v2 = arena
            .add_decision_node("v2", i, Some(ins), vec![(a.clone(), w3), (b.clone(), w4)])
            .unwrap();
        arena
            .add_possibility_node("root", vec![(v1, None), (v2, None)])
            .unwrap();

        arena.remove_action(ins, &b).unwrap();
        assert!(arena.get(w2).is_none());
        assert!(arena.get(w4).is_none());
        assert!(arena.outcome_nodes_of(&bad).is_empty());
        assert_eq!(arena.infoset(ins).unwrap().actions(), &[a.clone()]);
        assert_eq!(arena.get(v1).unwrap().children(), &[w1]);

        let err = arena.remove_action(ins, &a).unwrap_err();
        assert!(matches!(err, Error::Contract(ContractViolation::LastAction { .. })));
    }

    #[test]
    fn test_choice_history_follows_own_player() {
        let mut arena = Arena::<Rational>::new();
        let [l, r] = actions(["l", "r"]);
        let i = Player::new("i");
        let j = Player::new("j");
        let w = leaves(&mut arena, 4);
        let v_i2 = arena
            .add_decision_node("vi2", i.clone(), None, vec![(l.clone(), w[0]), (r.clone(), w[1])])
            .unwrap();
        let v_j = arena
            .add_decision_node("vj", j, None, vec![(l.clone(), v_i2), (r.clone(), w[2])])
            .unwrap();
        let v_i1 = arena
            .add_decision_node("vi1", i, None, vec![(l.clone(), w[3]), (r.clone(), v_j)])
            .unwrap();

        assert_eq!(arena.path(v_i2), vec![v_i1, v_j, v_i2]);
        let first_ins = arena.get(v_i1).unwrap().infoset().unwrap();
        assert_eq!(arena.choice_history(v_i2).unwrap(), vec![(first_ins, r)]);
        assert!(arena.choice_history(v_i1).unwrap().is_empty());
        assert!(arena.choice_history(w[0]).is_err());
    }
}
