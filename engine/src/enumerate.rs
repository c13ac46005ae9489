//! Enumeration of transitions, scenarios and strategies
//!
//! One recursive walker underlies every enumeration. At a node picked by the
//! [`Selection`] each successor is explored and the choice is recorded; at any
//! other inner node the completions of the successors are enumerated
//! independently and combined by cartesian product. In consistent mode
//! decision choices are recorded per information set and combinations that
//! assign one information set two different actions are silently dropped.
//!
//! Results are produced lazily where the tree allows it. Their number grows
//! exponentially with the branching of the tree; nothing is capped.

use std::collections::BTreeSet;
use std::iter;
use std::rc::Rc;

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::arena::Arena;
use crate::error::{ContractViolation, Result};
use crate::identity::{Action, Group};
use crate::node::{InfosetId, Node, NodeId, NodeKind};
use crate::solution::{Choice, PartialSolution, Scenario, Strategy, Transitions};
use crate::tree::Branch;
use crate::value::Probability;

/// Lazily produced results borrowing from a tree
pub type Enumeration<'t, T> = Box<dyn Iterator<Item = T> + 't>;

/// Filter deciding which actions may be explored at an information set
pub(crate) type Admissible<'t> = Box<dyn Fn(InfosetId, &Action) -> bool + 't>;

/// Whose decision nodes a selection picks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerScope {
    All,
    Inside(Group),
    Outside(Group),
}

/// Which inner nodes are free during an enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    kinds: BTreeSet<NodeKind>,
    players: PlayerScope,
    consistent: bool,
    skip: BTreeSet<NodeId>,
}

impl Selection {
    /// Select exactly `kinds`; only inner kinds may be named.
    pub fn including(kinds: impl IntoIterator<Item = NodeKind>) -> Result<Self> {
        let kinds: BTreeSet<NodeKind> = kinds.into_iter().collect();
        if kinds.contains(&NodeKind::Outcome) {
            return Err(ContractViolation::LeafKindSelected(NodeKind::Outcome.to_string()).into());
        }
        Ok(Selection {
            kinds,
            players: PlayerScope::All,
            consistent: false,
            skip: BTreeSet::new(),
        })
    }

    /// Select every inner kind except `kinds`.
    pub fn excluding(kinds: impl IntoIterator<Item = NodeKind>) -> Result<Self> {
        let excluded: BTreeSet<NodeKind> = kinds.into_iter().collect();
        if excluded.contains(&NodeKind::Outcome) {
            return Err(ContractViolation::LeafKindSelected(NodeKind::Outcome.to_string()).into());
        }
        Self::including(NodeKind::INNER.into_iter().filter(|k| !excluded.contains(k)))
    }

    /// Only decision nodes of players in `group`
    pub fn inside(mut self, group: Group) -> Self {
        self.players = PlayerScope::Inside(group);
        self
    }

    /// Only decision nodes of players not in `group`
    pub fn outside(mut self, group: Group) -> Self {
        self.players = PlayerScope::Outside(group);
        self
    }

    /// Record decision choices per information set and drop conflicting
    /// combinations.
    pub fn consistent(mut self) -> Self {
        self.consistent = true;
        self
    }

    /// Never select `node`, whatever its kind.
    pub fn skipping(mut self, node: NodeId) -> Self {
        self.skip.insert(node);
        self
    }

    pub fn is_consistent(&self) -> bool {
        self.consistent
    }

    pub fn selects<P>(&self, node: &Node<P>) -> bool {
        if self.skip.contains(&node.id()) || !self.kinds.contains(&node.kind()) {
            return false;
        }
        match (node.player(), &self.players) {
            (Some(player), PlayerScope::Inside(group)) => group.contains(player),
            (Some(player), PlayerScope::Outside(group)) => !group.contains(player),
            _ => true,
        }
    }
}

struct Walk<'t, P> {
    arena: &'t Arena<P>,
    selection: Selection,
    fixed: Transitions,
    admissible: Option<Admissible<'t>>,
}

/// Combine one completion per successor into a single assignment.
fn merge(parts: &[Transitions], consistent: bool) -> Option<Transitions> {
    let mut merged = Transitions::new();
    for part in parts {
        if consistent {
            if !merged.merge_consistently(part) {
                return None;
            }
        } else {
            merged.overwrite_with(part);
        }
    }
    Some(merged)
}

/// Cartesian product of independently enumerated completions.
fn product<'t>(parts: Vec<Vec<Transitions>>, consistent: bool) -> Enumeration<'t, Transitions> {
    Box::new(
        parts
            .into_iter()
            .map(Vec::into_iter)
            .multi_cartesian_product()
            .filter_map(move |combo| merge(&combo, consistent)),
    )
}

fn walk<'t, P: Probability + 't>(ctx: &Rc<Walk<'t, P>>, id: NodeId) -> Enumeration<'t, Transitions> {
    let Some(node) = ctx.arena.get(id) else {
        return Box::new(iter::empty());
    };
    if node.is_leaf() {
        return Box::new(iter::once(Transitions::new()));
    }
    let consistent = ctx.selection.consistent;
    if !ctx.selection.selects(node) {
        let parts: Vec<Vec<Transitions>> = node
            .children()
            .iter()
            .map(|&c| walk(ctx, c).collect())
            .collect();
        return product(parts, consistent);
    }

    let fixed = ctx.fixed.successor(id);
    let mut edges: Vec<(Choice, NodeId)> = Vec::new();
    match node {
        Node::Decision {
            infoset,
            actions,
            children,
            ..
        } => {
            let fixed_action = ctx.fixed.action(*infoset);
            for (action, &child) in actions.iter().zip(children) {
                if fixed.is_some_and(|s| s != child) || fixed_action.is_some_and(|a| a != action) {
                    continue;
                }
                let is_free = fixed.is_none() && fixed_action.is_none();
                if is_free && !ctx.admissible.as_ref().map_or(true, |ok| ok(*infoset, action)) {
                    continue;
                }
                let choice = if consistent {
                    Choice::Action {
                        infoset: *infoset,
                        action: action.clone(),
                    }
                } else {
                    Choice::Successor {
                        node: id,
                        successor: child,
                    }
                };
                edges.push((choice, child));
            }
        }
        _ => {
            for &child in node.children() {
                if fixed.is_some_and(|s| s != child) {
                    continue;
                }
                edges.push((Choice::Successor { node: id, successor: child }, child));
            }
        }
    }

    let ctx = Rc::clone(ctx);
    Box::new(edges.into_iter().flat_map(move |(choice, child)| {
        walk(&ctx, child).filter_map(move |mut t| t.assign(choice.clone(), consistent).then_some(t))
    }))
}

/// Enumerate completions below `start`.
pub(crate) fn transitions_from<'t, P: Probability + 't>(
    arena: &'t Arena<P>,
    selection: Selection,
    fixed: Transitions,
    admissible: Option<Admissible<'t>>,
    start: NodeId,
) -> Enumeration<'t, Transitions> {
    let ctx = Rc::new(Walk {
        arena,
        selection,
        fixed,
        admissible,
    });
    walk(&ctx, start)
}

impl<'t, P: Probability + 't> Branch<'t, P> {
    /// Decision nodes sharing the information set of `node` within this
    /// branch when `node` belongs to a player of `group`, else just `node`.
    fn anchors(&self, node: NodeId, group: &Group) -> Result<(Vec<NodeId>, Option<InfosetId>)> {
        match self.arena().node(node)? {
            Node::Decision {
                player, infoset, ..
            } if group.contains(player) => {
                let members = self
                    .arena()
                    .infoset(*infoset)?
                    .nodes()
                    .iter()
                    .copied()
                    .filter(|&m| self.contains(m))
                    .collect();
                Ok((members, Some(*infoset)))
            }
            _ => Ok((vec![node], None)),
        }
    }

    /// All completions below `node` of the nodes picked by `selection`,
    /// honouring the choices already made in `fixed`.
    pub fn get_transitions(
        &self,
        node: NodeId,
        selection: &Selection,
        fixed: &Transitions,
    ) -> Result<Enumeration<'t, Transitions>> {
        self.ensure_within(node)?;
        fixed.validate(self.arena())?;
        Ok(transitions_from(
            self.arena(),
            selection.clone(),
            fixed.clone(),
            None,
            node,
        ))
    }

    pub fn get_partial_solutions(
        &self,
        node: NodeId,
        selection: &Selection,
    ) -> Result<Enumeration<'t, PartialSolution>> {
        let transitions = self.get_transitions(node, selection, &Transitions::new())?;
        Ok(Box::new(transitions.map(PartialSolution::from_transitions)))
    }

    /// Every resolution of nature and of the players outside `group` below
    /// `node`. At a decision node of `group` one set of scenarios is produced
    /// per member of its information set, each anchored at that member.
    #[instrument(level = "debug", skip(self, group), fields(group = %group))]
    pub fn get_scenarios(&self, node: NodeId, group: &Group) -> Result<Enumeration<'t, Scenario>> {
        self.ensure_within(node)?;
        let (anchors, _) = self.anchors(node, group)?;
        let selection = Selection::including([NodeKind::Possibility, NodeKind::Decision])?
            .outside(group.clone())
            .consistent();
        debug!(anchors = anchors.len(), "enumerating scenarios");
        let arena = self.arena();
        Ok(Box::new(anchors.into_iter().flat_map(move |anchor| {
            transitions_from(arena, selection.clone(), Transitions::new(), None, anchor)
                .map(move |t| Scenario::anchored(anchor, t))
        })))
    }

    /// Every strategy of `group` below `node`.
    pub fn get_strategies(&self, node: NodeId, group: &Group) -> Result<Enumeration<'t, Strategy>> {
        self.get_strategies_fixing(node, group, &Transitions::new())
    }

    /// Strategies of `group` below `node` that agree with `fixed`; the fixed
    /// choices reached are part of every result.
    #[instrument(level = "debug", skip(self, group), fields(group = %group))]
    pub fn get_strategies_fixing(
        &self,
        node: NodeId,
        group: &Group,
        fixed: &Transitions,
    ) -> Result<Enumeration<'t, Strategy>> {
        self.ensure_within(node)?;
        fixed.validate(self.arena())?;
        let (anchors, start) = self.anchors(node, group)?;
        let selection = Selection::including([NodeKind::Decision])?
            .inside(group.clone())
            .consistent();
        let ctx = Rc::new(Walk {
            arena: self.arena(),
            selection,
            fixed: fixed.clone(),
            admissible: None,
        });
        let transitions = match anchors.as_slice() {
            [single] => walk(&ctx, *single),
            _ => {
                // all members must be decided alike
                let parts: Vec<Vec<Transitions>> =
                    anchors.iter().map(|&m| walk(&ctx, m).collect()).collect();
                product(parts, true)
            }
        };
        Ok(Box::new(
            transitions.map(move |t| Strategy::from_transitions(t, start)),
        ))
    }
}
