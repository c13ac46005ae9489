//! culpa Engine - decision trees for responsibility analysis
//!
//! This crate holds the tree model (possibility, probability, decision and
//! outcome nodes grouped into information sets), enumeration of scenarios and
//! strategies, the memoized likelihood evaluator, and the dominance tests
//! behind the trust-based reduced tree.
//!
//! The engine has no I/O; trees are built through [`arena::Arena`] or the
//! `culpa-tree` builder.

pub mod arena;
pub mod config;
pub mod dominance;
pub mod enumerate;
pub mod error;
pub mod evaluate;
pub mod identity;
pub mod infoset;
pub mod node;
pub mod solution;
pub mod test_tree;
pub mod tree;
pub mod value;

pub use config::EngineConfig;
pub use error::{ContractViolation, Error, Overflow, Result, StructuralViolation};
pub use evaluate::{Attribute, Distribution, Resolve};
pub use identity::{Action, Group, Outcome, Player};
pub use node::{InfosetId, Node, NodeId, NodeKind};
pub use solution::{PartialSolution, Scenario, Strategy, Transitions};
pub use tree::{Branch, Substitution, Tree};
pub use value::{ratio, Probability, Rational};
