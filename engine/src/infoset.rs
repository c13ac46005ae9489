//! Information sets
//!
//! An information set groups the decision nodes a player cannot tell apart.
//! Members are kept in insertion order; the common action set is taken from
//! the first member and checked against every later one.

use std::fmt;

use crate::identity::{Action, Player};
use crate::node::{InfosetId, NodeId};

#[derive(Debug, Clone, PartialEq)]
pub struct InformationSet {
    pub(crate) id: InfosetId,
    pub(crate) name: String,
    pub(crate) player: Option<Player>,
    pub(crate) nodes: Vec<NodeId>,
    /// Common action set, fixed by the first member
    pub(crate) actions: Option<Vec<Action>>,
}

impl InformationSet {
    pub(crate) fn new(id: InfosetId, name: impl Into<String>) -> Self {
        InformationSet {
            id,
            name: name.into(),
            player: None,
            nodes: Vec::new(),
            actions: None,
        }
    }

    pub fn id(&self) -> InfosetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The acting player, None while the set is still empty
    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    /// Member decision nodes in insertion order
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// The common action set (empty while the set has no members)
    pub fn actions(&self) -> &[Action] {
        self.actions.as_deref().unwrap_or(&[])
    }

    pub fn has_action(&self, action: &Action) -> bool {
        self.actions().contains(action)
    }

    pub fn is_singleton(&self) -> bool {
        self.nodes.len() == 1
    }
}

impl fmt::Display for InformationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let player = self.player.as_ref().map(Player::name).unwrap_or("?");
        let actions: Vec<&str> = self.actions().iter().map(Action::name).collect();
        write!(
            f,
            "{} ({}; {} nodes; [{}])",
            self.name,
            player,
            self.nodes.len(),
            actions.join(", ")
        )
    }
}

/// Whether two action lists describe the same set of actions.
pub(crate) fn same_action_set(a: &[Action], b: &[Action]) -> bool {
    a.len() == b.len() && a.iter().all(|x| b.contains(x))
}

pub(crate) fn join_actions(actions: &[Action]) -> String {
    actions
        .iter()
        .map(Action::name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::actions;

    #[test]
    fn test_same_action_set_ignores_order() {
        let [a, b, c] = actions(["a", "b", "c"]);
        assert!(same_action_set(&[a.clone(), b.clone()], &[b.clone(), a.clone()]));
        assert!(!same_action_set(&[a.clone(), b.clone()], &[a.clone(), c.clone()]));
        assert!(!same_action_set(&[a.clone()], &[a, b]));
    }

    #[test]
    fn test_empty_set_display() {
        let ins = InformationSet::new(4, "S");
        assert!(ins.actions().is_empty());
        assert_eq!(ins.player(), None);
        assert_eq!(ins.to_string(), "S (?; 0 nodes; [])");
    }
}
