//! Trees and branches
//!
//! A [`Tree`] owns an [`Arena`] together with its root, its configuration and
//! its memoization caches. A [`Branch`] is a cheap, read-only view of the
//! subtree below some node; all discovery, enumeration and evaluation queries
//! are asked through a branch.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, instrument};

use crate::arena::Arena;
use crate::config::EngineConfig;
use crate::error::{ContractViolation, Result, StructuralViolation};
use crate::evaluate::Memo;
use crate::identity::{Action, Group, Outcome, Player};
use crate::node::{InfosetId, Node, NodeId, NodeKind};
use crate::solution::Transitions;
use crate::value::{Probability, Rational};

static NEXT_UID: AtomicU64 = AtomicU64::new(1);

fn next_uid() -> u64 {
    NEXT_UID.fetch_add(1, Ordering::Relaxed)
}

/// A validated decision tree.
///
/// Mutation is limited to action removal and information-set renames, both of
/// which drop the memoization caches.
#[derive(Debug)]
pub struct Tree<P = Rational> {
    /// Process-unique identity, fresh for every clone
    uid: u64,
    name: String,
    arena: Arena<P>,
    root: NodeId,
    config: EngineConfig,
    pub(crate) memo: Memo<P>,
}

/// Old-to-new ID mapping produced by cloning a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    nodes: HashMap<NodeId, NodeId>,
    infosets: HashMap<InfosetId, InfosetId>,
}

impl Substitution {
    pub fn node(&self, old: NodeId) -> Option<NodeId> {
        self.nodes.get(&old).copied()
    }

    pub fn infoset(&self, old: InfosetId) -> Option<InfosetId> {
        self.infosets.get(&old).copied()
    }

    /// Number of nodes carried over
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Translate an assignment into the clone, dropping entries whose node
    /// or information set was not carried over.
    pub fn transitions(&self, transitions: &Transitions) -> Transitions {
        let mut out = Transitions::new();
        for (node, successor) in transitions.node_choices() {
            if let (Some(n), Some(s)) = (self.node(node), self.node(successor)) {
                out.set_successor(n, s);
            }
        }
        for (ins, action) in transitions.infoset_choices() {
            if let Some(i) = self.infoset(ins) {
                out.set_action(i, action.clone());
            }
        }
        out
    }
}

/// Check root, arena, and reachability of every live node.
fn check_tree<P: Probability>(arena: &Arena<P>, root: NodeId) -> Result<()> {
    let node = arena.node(root)?;
    if node.parent().is_some() {
        return Err(StructuralViolation::RootHasPredecessor(arena.label(root)).into());
    }
    arena.validate()?;
    let reachable: HashSet<NodeId> = arena.descendants(root).into_iter().collect();
    if let Some(stray) = arena.iter().map(Node::id).find(|id| !reachable.contains(id)) {
        return Err(StructuralViolation::Dangling(stray).into());
    }
    Ok(())
}

impl<P: Probability> Tree<P> {
    /// Wrap a fully built arena. Fails if `root` has a predecessor, if any
    /// node or information set is malformed, or if a live node cannot be
    /// reached from `root`.
    pub fn new(name: impl Into<String>, arena: Arena<P>, root: NodeId) -> Result<Self> {
        check_tree(&arena, root)?;
        Ok(Tree {
            uid: next_uid(),
            name: name.into(),
            arena,
            root,
            config: EngineConfig::default(),
            memo: Memo::default(),
        })
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self.memo.clear();
        self
    }

    pub fn uid(&self) -> u64 {
        self.uid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn arena(&self) -> &Arena<P> {
        &self.arena
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn node(&self, id: NodeId) -> Result<&Node<P>> {
        self.arena.node(id)
    }

    /// Re-run whole-tree validation.
    pub fn validate(&self) -> Result<()> {
        check_tree(&self.arena, self.root)
    }

    /// The view of the whole tree
    pub fn root_branch(&self) -> Branch<'_, P> {
        Branch {
            tree: self,
            root: self.root,
        }
    }

    /// The view of the subtree rooted at `node`
    pub fn branch(&self, node: NodeId) -> Result<Branch<'_, P>> {
        self.arena.node(node)?;
        Ok(Branch { tree: self, root: node })
    }

    /// Remove `action` from an information set, severing the subtrees it
    /// leads to.
    pub fn remove_action(&mut self, ins: InfosetId, action: &Action) -> Result<()> {
        self.arena.remove_action(ins, action)?;
        self.memo.clear();
        Ok(())
    }

    pub fn rename_information_set(&mut self, ins: InfosetId, name: impl Into<String>) -> Result<()> {
        self.arena.rename_information_set(ins, name.into())?;
        self.memo.clear();
        Ok(())
    }

    /// Independent copy with compacted IDs.
    pub fn clone_named(&self, name: impl Into<String>) -> Result<(Tree<P>, Substitution)> {
        self.rebuild(name.into(), |_| true)
    }

    /// Copy of the part of the tree consistent with reaching `ins`: the paths
    /// from the root to every member and the members' full subtrees.
    /// Probabilities of cut probability nodes are renormalised.
    ///
    /// Every kept decision node keeps the union of the actions kept anywhere
    /// in its information set, together with the subtrees they lead to, so
    /// the members of each set still share one action set.
    #[instrument(level = "debug", skip(self, name), fields(tree = %self.name))]
    pub fn clone_constrained(
        &self,
        name: impl Into<String>,
        ins: InfosetId,
    ) -> Result<(Tree<P>, Substitution)> {
        let set = self.arena.infoset(ins)?;
        if set.nodes().is_empty() {
            return Err(ContractViolation::EmptyInformationSet(set.name().to_string()).into());
        }
        let mut keep = HashSet::new();
        for &member in set.nodes() {
            keep.extend(self.arena.path(member));
            keep.extend(self.arena.descendants(member));
        }
        loop {
            let mut needed: HashMap<InfosetId, BTreeSet<&Action>> = HashMap::new();
            for &id in &keep {
                if let Node::Decision {
                    infoset,
                    actions,
                    children,
                    ..
                } = self.arena.node(id)?
                {
                    let used = needed.entry(*infoset).or_default();
                    used.extend(
                        actions
                            .iter()
                            .zip(children)
                            .filter(|(_, c)| keep.contains(*c))
                            .map(|(a, _)| a),
                    );
                }
            }
            let mut missing = Vec::new();
            for &id in &keep {
                if let Node::Decision {
                    infoset,
                    actions,
                    children,
                    ..
                } = self.arena.node(id)?
                {
                    let used = &needed[infoset];
                    missing.extend(
                        actions
                            .iter()
                            .zip(children)
                            .filter(|(a, c)| used.contains(a) && !keep.contains(*c))
                            .map(|(_, &c)| c),
                    );
                }
            }
            if missing.is_empty() {
                break;
            }
            debug!(added = missing.len(), "completing action sets of the constrained clone");
            for child in missing {
                keep.extend(self.arena.descendants(child));
            }
        }
        self.rebuild(name.into(), |id| keep.contains(&id))
    }

    /// Copy every kept node leaves first into a fresh arena.
    fn rebuild(&self, name: String, keep: impl Fn(NodeId) -> bool) -> Result<(Tree<P>, Substitution)> {
        let mut arena = Arena::new();
        let mut subs = Substitution::default();
        let mut stack = vec![(self.root, false)];
        while let Some((id, expanded)) = stack.pop() {
            let node = self.arena.node(id)?;
            if !expanded {
                stack.push((id, true));
                stack.extend(
                    node.children()
                        .iter()
                        .rev()
                        .filter(|&&c| keep(c))
                        .map(|&c| (c, false)),
                );
                continue;
            }
            // (position among the old successors, new id)
            let kept: Vec<(usize, NodeId)> = node
                .children()
                .iter()
                .enumerate()
                .filter_map(|(k, c)| subs.node(*c).map(|n| (k, n)))
                .collect();
            let new_id = match node {
                Node::Outcome { name, outcome, .. } => {
                    arena.add_outcome_node(name.clone(), outcome.clone())
                }
                Node::Possibility { name, labels, .. } => arena.add_possibility_node(
                    name.clone(),
                    kept.iter().map(|&(k, n)| (n, labels[k].clone())).collect(),
                )?,
                Node::Probability {
                    name,
                    probabilities,
                    ..
                } => {
                    let mut total = P::zero();
                    for &(k, _) in &kept {
                        total = total.try_add(&probabilities[k])?;
                    }
                    let total = total.simplify();
                    if total.is_zero() {
                        return Err(StructuralViolation::ProbabilitySum {
                            node: name.clone(),
                            total: total.to_string(),
                        }
                        .into());
                    }
                    let mut successors = Vec::with_capacity(kept.len());
                    for &(k, n) in &kept {
                        successors.push((n, probabilities[k].try_div(&total)?.simplify()));
                    }
                    arena.add_probability_node(name.clone(), successors)?
                }
                Node::Decision {
                    name,
                    player,
                    infoset,
                    actions,
                    ..
                } => {
                    let new_ins = match subs.infoset(*infoset) {
                        Some(i) => i,
                        None => {
                            let i = arena.add_information_set(self.arena.infoset(*infoset)?.name());
                            subs.infosets.insert(*infoset, i);
                            i
                        }
                    };
                    arena.add_decision_node(
                        name.clone(),
                        player.clone(),
                        Some(new_ins),
                        kept.iter().map(|&(k, n)| (actions[k].clone(), n)).collect(),
                    )?
                }
            };
            subs.nodes.insert(id, new_id);
        }
        let root = subs
            .node(self.root)
            .ok_or(ContractViolation::UnknownNode(self.root))?;
        let tree = Tree::new(name, arena, root)?.with_config(self.config.clone());
        debug!(
            from = %self.name,
            to = %tree.name,
            nodes = subs.len(),
            "cloned tree"
        );
        Ok((tree, subs))
    }
}

impl<P: Probability> Clone for Tree<P> {
    /// Same IDs and name, fresh identity and empty caches.
    fn clone(&self) -> Self {
        Tree {
            uid: next_uid(),
            name: self.name.clone(),
            arena: self.arena.clone(),
            root: self.root,
            config: self.config.clone(),
            memo: Memo::default(),
        }
    }
}

impl<P: Probability> fmt::Display for Tree<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root_branch(), f)
    }
}

/// Read-only view of the subtree rooted at one node.
pub struct Branch<'t, P = Rational> {
    pub(crate) tree: &'t Tree<P>,
    pub(crate) root: NodeId,
}

impl<P> Clone for Branch<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Branch<'_, P> {}

impl<'t, P: Probability> Branch<'t, P> {
    pub fn tree(&self) -> &'t Tree<P> {
        self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn arena(&self) -> &'t Arena<P> {
        &self.tree.arena
    }

    /// Whether `node` lies in this branch
    pub fn contains(&self, node: NodeId) -> bool {
        self.arena().is_within(node, self.root)
    }

    pub(crate) fn ensure_within(&self, node: NodeId) -> Result<()> {
        self.arena().node(node)?;
        if !self.contains(node) {
            return Err(ContractViolation::OutsideBranch {
                node: self.arena().label(node),
                root: self.arena().label(self.root),
            }
            .into());
        }
        Ok(())
    }

    fn live(&self) -> impl Iterator<Item = &'t Node<P>> + 't {
        let arena = self.arena();
        arena
            .descendants(self.root)
            .into_iter()
            .filter_map(move |id| arena.get(id))
    }

    /// All nodes in pre-order
    pub fn nodes(&self) -> Vec<NodeId> {
        self.arena().descendants(self.root)
    }

    pub fn named_nodes(&self) -> BTreeMap<String, NodeId> {
        self.live()
            .filter(|n| n.is_named())
            .map(|n| (n.name().to_string(), n.id()))
            .collect()
    }

    pub fn unnamed_nodes(&self) -> Vec<NodeId> {
        self.live().filter(|n| !n.is_named()).map(Node::id).collect()
    }

    /// First node in pre-order carrying `name`
    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.live().find(|n| n.name() == name).map(Node::id)
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        self.live().filter(|n| n.kind() == kind).map(Node::id).collect()
    }

    pub fn inner_nodes(&self) -> Vec<NodeId> {
        self.live().filter(|n| !n.is_leaf()).map(Node::id).collect()
    }

    pub fn possibility_nodes(&self) -> Vec<NodeId> {
        self.nodes_of_kind(NodeKind::Possibility)
    }

    pub fn probability_nodes(&self) -> Vec<NodeId> {
        self.nodes_of_kind(NodeKind::Probability)
    }

    pub fn decision_nodes(&self) -> Vec<NodeId> {
        self.nodes_of_kind(NodeKind::Decision)
    }

    pub fn outcome_nodes(&self) -> Vec<NodeId> {
        self.nodes_of_kind(NodeKind::Outcome)
    }

    pub fn players(&self) -> BTreeSet<Player> {
        self.live().filter_map(|n| n.player().cloned()).collect()
    }

    /// The group of every player acting in this branch
    pub fn all_players(&self) -> Group {
        Group::new("all", self.players())
    }

    pub fn outcomes(&self) -> BTreeSet<Outcome> {
        self.live().filter_map(|n| n.outcome().cloned()).collect()
    }

    pub fn actions(&self) -> BTreeSet<Action> {
        self.live().flat_map(|n| n.actions().iter().cloned()).collect()
    }

    pub fn decision_nodes_of(&self, group: &Group) -> Vec<NodeId> {
        self.live()
            .filter(|n| n.player().is_some_and(|p| group.contains(p)))
            .map(Node::id)
            .collect()
    }

    /// Information sets with a member in this branch, by first member in pre-order
    pub fn information_sets(&self) -> Vec<InfosetId> {
        let mut seen = Vec::new();
        for ins in self.live().filter_map(Node::infoset) {
            if !seen.contains(&ins) {
                seen.push(ins);
            }
        }
        seen
    }

    pub fn information_sets_of(&self, group: &Group) -> Vec<InfosetId> {
        let mut seen = Vec::new();
        for node in self.live() {
            if let (Some(player), Some(ins)) = (node.player(), node.infoset()) {
                if group.contains(player) && !seen.contains(&ins) {
                    seen.push(ins);
                }
            }
        }
        seen
    }

    pub fn information_set_by_name(&self, name: &str) -> Option<InfosetId> {
        self.information_sets().into_iter().find(|&ins| {
            self.arena()
                .information_set(ins)
                .is_some_and(|s| s.name() == name)
        })
    }

    /// Text label of a node as shown in the rendered tree
    pub fn describe(&self, id: NodeId) -> String {
        let arena = self.arena();
        let Some(node) = arena.get(id) else {
            return format!("#{id}");
        };
        let label = match node {
            Node::Outcome { name, outcome, .. } => format!("{name}: {outcome}"),
            Node::Decision {
                name,
                player,
                infoset,
                ..
            } => match arena.information_set(*infoset) {
                Some(ins) if !ins.is_singleton() => format!("{name} ({}): {player}", ins.name()),
                _ => format!("{name}: {player}"),
            },
            Node::Probability { name, .. } if name.is_empty() => "⚄".to_string(),
            Node::Possibility { name, .. } if name.is_empty() => "•".to_string(),
            other => other.name().to_string(),
        };
        let edge = match node.parent() {
            Some(parent) if id != self.root => arena.get(parent).and_then(|p| p.edge_label(id)),
            _ => None,
        };
        match edge {
            Some(edge) => format!("{edge}╶─╴{label}"),
            None => label,
        }
    }

    /// The branch as an indented text tree.
    pub fn render(&self) -> termtree::Tree<String> {
        let mut built: HashMap<NodeId, termtree::Tree<String>> = HashMap::new();
        // reversed pre-order visits successors before their predecessor
        for id in self.nodes().into_iter().rev() {
            let Some(node) = self.arena().get(id) else {
                continue;
            };
            let leaves: Vec<termtree::Tree<String>> = node
                .children()
                .iter()
                .filter_map(|c| built.remove(c))
                .collect();
            built.insert(id, termtree::Tree::new(self.describe(id)).with_leaves(leaves));
        }
        built
            .remove(&self.root)
            .unwrap_or_else(|| termtree::Tree::new(format!("#{}", self.root)))
    }
}

impl<P: Probability> fmt::Display for Branch<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}
