//! Node definitions for decision trees
//!
//! This module defines the four node kinds of an extensive-form decision tree
//! with imperfect information. Nodes live in a flat arena (see
//! [`crate::arena::Arena`]) and refer to each other by [`NodeId`]; they carry
//! only structure, never evaluation state.

use std::fmt;

use crate::identity::{Action, Outcome, Player};

/// Node ID type (index into the arena's flat node storage)
pub type NodeId = u32;

/// Information set ID type (index into the arena's information set storage)
pub type InfosetId = u32;

/// The four kinds of node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    /// Uncertainty without known probabilities
    Possibility,
    /// Uncertainty with known probabilities
    Probability,
    /// A player's choice
    Decision,
    /// Leaf carrying an outcome
    Outcome,
}

impl NodeKind {
    /// All kinds that can have successors.
    pub const INNER: [NodeKind; 3] = [
        NodeKind::Possibility,
        NodeKind::Probability,
        NodeKind::Decision,
    ];

    pub fn is_inner(self) -> bool {
        self != NodeKind::Outcome
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Possibility => "possibility",
            NodeKind::Probability => "probability",
            NodeKind::Decision => "decision",
            NodeKind::Outcome => "outcome",
        };
        f.write_str(s)
    }
}

/// Represents a node in the decision tree
///
/// Successor lists are parallel to their payload lists (`labels`,
/// `probabilities`, `actions`): entry `k` of each describes the same edge.
#[derive(Debug, Clone)]
pub enum Node<P> {
    /// Nature chooses freely among the successors
    Possibility {
        /// Unique identifier for this node (index in the arena)
        id: NodeId,
        /// Display name, empty for unnamed nodes
        name: String,
        /// Parent node ID (None for root)
        parent: Option<NodeId>,
        /// Successor node IDs
        children: Vec<NodeId>,
        /// Optional edge label per successor
        labels: Vec<Option<String>>,
    },
    /// Nature chooses with known probabilities
    Probability {
        id: NodeId,
        name: String,
        parent: Option<NodeId>,
        children: Vec<NodeId>,
        /// Probability per successor, summing to one
        probabilities: Vec<P>,
    },
    /// A player chooses an action
    Decision {
        id: NodeId,
        name: String,
        parent: Option<NodeId>,
        /// Player to act
        player: Player,
        /// Information set this node belongs to
        infoset: InfosetId,
        /// Available actions, one per successor
        actions: Vec<Action>,
        children: Vec<NodeId>,
    },
    /// Leaf node
    Outcome {
        id: NodeId,
        name: String,
        parent: Option<NodeId>,
        outcome: Outcome,
    },
}

impl<P> Node<P> {
    /// Get the node ID
    pub fn id(&self) -> NodeId {
        match self {
            Node::Possibility { id, .. }
            | Node::Probability { id, .. }
            | Node::Decision { id, .. }
            | Node::Outcome { id, .. } => *id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Possibility { name, .. }
            | Node::Probability { name, .. }
            | Node::Decision { name, .. }
            | Node::Outcome { name, .. } => name,
        }
    }

    /// Whether the node was given a name
    pub fn is_named(&self) -> bool {
        !self.name().is_empty()
    }

    /// Get the parent node ID
    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Possibility { parent, .. }
            | Node::Probability { parent, .. }
            | Node::Decision { parent, .. }
            | Node::Outcome { parent, .. } => *parent,
        }
    }

    pub(crate) fn set_parent(&mut self, value: Option<NodeId>) {
        match self {
            Node::Possibility { parent, .. }
            | Node::Probability { parent, .. }
            | Node::Decision { parent, .. }
            | Node::Outcome { parent, .. } => *parent = value,
        }
    }

    /// Get successor node IDs
    pub fn children(&self) -> &[NodeId] {
        match self {
            Node::Possibility { children, .. }
            | Node::Probability { children, .. }
            | Node::Decision { children, .. } => children,
            Node::Outcome { .. } => &[],
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Possibility { .. } => NodeKind::Possibility,
            Node::Probability { .. } => NodeKind::Probability,
            Node::Decision { .. } => NodeKind::Decision,
            Node::Outcome { .. } => NodeKind::Outcome,
        }
    }

    /// Acting player (only for Decision nodes)
    pub fn player(&self) -> Option<&Player> {
        match self {
            Node::Decision { player, .. } => Some(player),
            _ => None,
        }
    }

    /// Information set ID (only for Decision nodes)
    pub fn infoset(&self) -> Option<InfosetId> {
        match self {
            Node::Decision { infoset, .. } => Some(*infoset),
            _ => None,
        }
    }

    /// Available actions (empty unless Decision)
    pub fn actions(&self) -> &[Action] {
        match self {
            Node::Decision { actions, .. } => actions,
            _ => &[],
        }
    }

    /// Successor reached by `action` (only for Decision nodes)
    pub fn consequence(&self, action: &Action) -> Option<NodeId> {
        match self {
            Node::Decision {
                actions, children, ..
            } => actions
                .iter()
                .position(|a| a == action)
                .map(|k| children[k]),
            _ => None,
        }
    }

    /// Action leading to `child` (only for Decision nodes)
    pub fn action_to(&self, child: NodeId) -> Option<&Action> {
        match self {
            Node::Decision {
                actions, children, ..
            } => children
                .iter()
                .position(|&c| c == child)
                .map(|k| &actions[k]),
            _ => None,
        }
    }

    /// The referenced outcome (only for Outcome nodes)
    pub fn outcome(&self) -> Option<&Outcome> {
        match self {
            Node::Outcome { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    /// Edge label towards `child`: the action, probability, or possibility label
    pub fn edge_label(&self, child: NodeId) -> Option<String>
    where
        P: fmt::Display,
    {
        let k = self.children().iter().position(|&c| c == child)?;
        match self {
            Node::Possibility { labels, .. } => labels[k].clone(),
            Node::Probability { probabilities, .. } => Some(probabilities[k].to_string()),
            Node::Decision { actions, .. } => Some(actions[k].to_string()),
            Node::Outcome { .. } => None,
        }
    }

    /// Check if this is a leaf
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Outcome { .. })
    }

    pub fn is_decision(&self) -> bool {
        matches!(self, Node::Decision { .. })
    }

    pub fn is_probability(&self) -> bool {
        matches!(self, Node::Probability { .. })
    }

    pub fn is_possibility(&self) -> bool {
        matches!(self, Node::Possibility { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{ratio, Rational};

    fn decision() -> Node<Rational> {
        Node::Decision {
            id: 3,
            name: "v".into(),
            parent: None,
            player: Player::new("i"),
            infoset: 0,
            actions: vec![Action::new("a"), Action::new("b")],
            children: vec![1, 2],
        }
    }

    #[test]
    fn test_decision_accessors() {
        let node = decision();
        assert_eq!(node.id(), 3);
        assert_eq!(node.kind(), NodeKind::Decision);
        assert_eq!(node.consequence(&Action::new("b")), Some(2));
        assert_eq!(node.action_to(1), Some(&Action::new("a")));
        assert_eq!(node.consequence(&Action::new("c")), None);
        assert_eq!(node.edge_label(2).as_deref(), Some("b"));
    }

    #[test]
    fn test_leaf_has_no_children() {
        let leaf: Node<Rational> = Node::Outcome {
            id: 0,
            name: String::new(),
            parent: Some(3),
            outcome: Outcome::acceptable("ok"),
        };
        assert!(leaf.is_leaf());
        assert!(!leaf.is_named());
        assert!(leaf.children().is_empty());
        assert_eq!(leaf.edge_label(0), None);
    }

    #[test]
    fn test_probability_edge_label() {
        let node = Node::Probability {
            id: 2,
            name: "p".into(),
            parent: None,
            children: vec![0, 1],
            probabilities: vec![ratio(1, 3), ratio(2, 3)],
        };
        assert_eq!(node.edge_label(1).as_deref(), Some("2/3"));
        assert!(!NodeKind::Outcome.is_inner());
    }
}
