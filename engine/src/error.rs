//! Error taxonomy
//!
//! Two kinds of failure exist. A [`StructuralViolation`] means the tree itself
//! is malformed and is raised while nodes and information sets are built or
//! re-validated. A [`ContractViolation`] means a query was called with
//! arguments that make no sense for the tree at hand. An [`Overflow`] means
//! exact arithmetic on probabilities ran out of range. Absence of a dominance
//! relation or an inconsistent enumeration combination is not an error at all.

use thiserror::Error;

use crate::node::{InfosetId, NodeId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StructuralViolation {
    #[error("successor {child} of node '{parent}' already has a predecessor")]
    AlreadyOwned { parent: String, child: NodeId },

    #[error("successor {child} of node '{parent}' does not exist")]
    MissingSuccessor { parent: String, child: NodeId },

    #[error("successor {child} is listed twice at node '{parent}'")]
    DuplicateSuccessor { parent: String, child: NodeId },

    #[error("inner node '{0}' has no successors")]
    NoSuccessors(String),

    #[error("decision node '{0}' must have at least one action")]
    NoActions(String),

    #[error("action '{action}' is listed twice at decision node '{node}'")]
    DuplicateAction { node: String, action: String },

    #[error("probabilities at node '{node}' sum to {total}, not 1")]
    ProbabilitySum { node: String, total: String },

    #[error("probability {value} at node '{node}' is negative")]
    NegativeProbability { node: String, value: String },

    #[error("information set '{infoset}' mixes players '{expected}' and '{found}' (node '{node}')")]
    MixedPlayers {
        infoset: String,
        node: String,
        expected: String,
        found: String,
    },

    #[error("information set '{infoset}' expects actions [{expected}] but node '{node}' offers [{found}]")]
    MixedActions {
        infoset: String,
        node: String,
        expected: String,
        found: String,
    },

    #[error("information set '{infoset}' lists node {node} which is not a live decision node of it")]
    StaleMember { infoset: String, node: NodeId },

    #[error("node {0} is not reachable from the tree root")]
    Dangling(NodeId),

    #[error("root node '{0}' has a predecessor")]
    RootHasPredecessor(String),

    #[error("node {child} names {recorded:?} as predecessor but is a successor of {actual}")]
    BrokenLink {
        child: NodeId,
        recorded: Option<NodeId>,
        actual: NodeId,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractViolation {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("unknown information set {0}")]
    UnknownInformationSet(InfosetId),

    #[error("action '{action}' is not available at information set '{infoset}'")]
    UnknownAction { infoset: String, action: String },

    #[error("node '{node}' is not part of the branch rooted at '{root}'")]
    OutsideBranch { node: String, root: String },

    #[error("node {successor} is not a successor of node '{node}'")]
    NotASuccessor { node: String, successor: NodeId },

    #[error("node '{0}' is a leaf and cannot be assigned a transition")]
    LeafTransition(String),

    #[error("scenario and strategy both assign information set '{0}'")]
    OverlappingInformationSet(String),

    #[error("scenario and strategy both assign node '{0}'")]
    OverlappingNode(String),

    #[error("node '{0}' is not resolved by the given assignment")]
    UnresolvedNode(String),

    #[error("cannot remove '{action}', the only remaining action of information set '{infoset}'")]
    LastAction { infoset: String, action: String },

    #[error("a selection may only name inner node kinds, got {0}")]
    LeafKindSelected(String),

    #[error("scenario is anchored at '{anchor}' but evaluation starts at '{node}'")]
    AnchorMismatch { anchor: String, node: String },

    #[error("no consistent strategy exists for group '{group}' at node '{node}'")]
    NoConsistentStrategy { group: String, node: String },

    #[error("node '{0}' is not a decision node")]
    NotADecisionNode(String),

    #[error("values {0} and {1} cannot be compared")]
    Incomparable(String, String),

    #[error("information set '{0}' has no member nodes")]
    EmptyInformationSet(String),
}

/// An exact value left the representable range.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{lhs} {op} {rhs} exceeds the range of exact arithmetic")]
pub struct Overflow {
    pub op: &'static str,
    pub lhs: String,
    pub rhs: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("structural violation: {0}")]
    Structure(#[from] StructuralViolation),

    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),

    #[error("arithmetic: {0}")]
    Overflow(#[from] Overflow),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err: Error = StructuralViolation::ProbabilitySum {
            node: "risk".into(),
            total: "9/10".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "structural violation: probabilities at node 'risk' sum to 9/10, not 1"
        );

        let err: Error = ContractViolation::UnresolvedNode("v1".into()).into();
        assert!(err.to_string().contains("'v1'"));
    }
}
