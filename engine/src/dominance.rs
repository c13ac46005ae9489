//! Dominance between actions and the trust-based reduced tree
//!
//! Action `a1` dominates `a2` at an information set when, at every member
//! node and for every way the rest of the subtree may be completed, taking
//! `a1` leads to a likelihood of harm no larger than taking `a2`. Completions
//! range over all consistent choices of every player that are not themselves
//! strictly dominated; nature stays free and is resolved by max.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::ops::ControlFlow;
use std::rc::Rc;

use tracing::{debug, instrument};

use crate::enumerate::{transitions_from, Admissible, Enumeration, Selection};
use crate::error::{ContractViolation, Error, Result};
use crate::evaluate::{Attribute, Resolve};
use crate::identity::Action;
use crate::node::{InfosetId, NodeId, NodeKind};
use crate::solution::Transitions;
use crate::tree::{Substitution, Tree};
use crate::value::Probability;

/// Marks an information set as under evaluation for as long as it lives.
struct InProgress<'t, P> {
    tree: &'t Tree<P>,
    ins: InfosetId,
    inserted: bool,
}

impl<'t, P> InProgress<'t, P> {
    fn enter(tree: &'t Tree<P>, ins: InfosetId) -> Self {
        let inserted = tree.memo.in_progress.borrow_mut().insert(ins);
        InProgress { tree, ins, inserted }
    }
}

impl<P> Drop for InProgress<'_, P> {
    fn drop(&mut self) {
        if self.inserted {
            self.tree.memo.in_progress.borrow_mut().remove(&self.ins);
        }
    }
}

fn compare<P: Probability>(l1: &P, l2: &P) -> Result<Ordering> {
    l1.partial_cmp(l2)
        .ok_or_else(|| ContractViolation::Incomparable(l1.to_string(), l2.to_string()).into())
}

/// First error raised while filtering the actions of a completion
type Failure = Rc<RefCell<Option<Error>>>;

fn take_failure(failure: &Failure) -> Result<()> {
    match failure.borrow_mut().take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Completions of the subtree below member `v`, restricted to actions that
/// are not strictly dominated. An action whose check fails is left out and
/// the error is parked in `failure`.
fn undominated_transitions<'t, P: Probability + 't>(
    tree: &'t Tree<P>,
    v: NodeId,
    failure: &Failure,
) -> Result<Enumeration<'t, Transitions>> {
    let selection = Selection::including([NodeKind::Decision])?
        .consistent()
        .skipping(v);
    let failure = Rc::clone(failure);
    let admissible: Admissible<'t> = Box::new(move |ins: InfosetId, action: &Action| {
        match is_strictly_dominated(tree, action, ins) {
            Ok(dominated) => !dominated,
            Err(err) => {
                debug!(%err, ins, "dominance check failed");
                failure.borrow_mut().get_or_insert(err);
                false
            }
        }
    });
    Ok(transitions_from(
        tree.arena(),
        selection,
        Transitions::new(),
        Some(admissible),
        v,
    ))
}

/// Feed the likelihoods of `a1` and `a2` under every relevant completion to
/// `visit` until it breaks.
fn scan<P: Probability>(
    tree: &Tree<P>,
    ins: InfosetId,
    a1: &Action,
    a2: &Action,
    mut visit: impl FnMut(&P, &P) -> Result<ControlFlow<()>>,
) -> Result<()> {
    let set = tree.arena().infoset(ins)?;
    for action in [a1, a2] {
        if !set.has_action(action) {
            return Err(ContractViolation::UnknownAction {
                infoset: set.name().to_string(),
                action: action.to_string(),
            }
            .into());
        }
    }
    if set.nodes().is_empty() {
        return Err(ContractViolation::EmptyInformationSet(set.name().to_string()).into());
    }
    let _guard = InProgress::enter(tree, ins);
    let failure = Failure::default();
    for &v in set.nodes() {
        for tau in undominated_transitions(tree, v, &failure)? {
            take_failure(&failure)?;
            let with_a1 = tau.clone().with_action(ins, a1.clone());
            let l1 = tree.expectation_at(v, &with_a1, &Attribute::Unacceptable, Resolve::Max)?;
            let with_a2 = tau.with_action(ins, a2.clone());
            let l2 = tree.expectation_at(v, &with_a2, &Attribute::Unacceptable, Resolve::Max)?;
            if visit(&l1, &l2)?.is_break() {
                return Ok(());
            }
        }
        take_failure(&failure)?;
    }
    Ok(())
}

/// Whether `a1` is strictly better than `a2` at `ins` under every completion.
pub fn strictly_dominates<P: Probability>(tree: &Tree<P>, a1: &Action, a2: &Action, ins: InfosetId) -> Result<bool> {
    let mut verdict = true;
    scan(tree, ins, a1, a2, |l1, l2| {
        if compare(l1, l2)? == Ordering::Less {
            Ok(ControlFlow::Continue(()))
        } else {
            verdict = false;
            Ok(ControlFlow::Break(()))
        }
    })?;
    Ok(verdict)
}

/// Whether `a1` is never worse than `a2` at `ins` and better at least once.
pub fn weakly_dominates<P: Probability>(tree: &Tree<P>, a1: &Action, a2: &Action, ins: InfosetId) -> Result<bool> {
    let mut never_worse = true;
    let mut sometimes_better = false;
    scan(tree, ins, a1, a2, |l1, l2| match compare(l1, l2)? {
        Ordering::Greater => {
            never_worse = false;
            Ok(ControlFlow::Break(()))
        }
        Ordering::Less => {
            sometimes_better = true;
            Ok(ControlFlow::Continue(()))
        }
        Ordering::Equal => Ok(ControlFlow::Continue(())),
    })?;
    Ok(never_worse && sometimes_better)
}

/// Largest margin by which `a1` beats `a2`, or zero unless `a1` weakly
/// dominates `a2`.
pub fn domination_strength<P: Probability>(tree: &Tree<P>, a1: &Action, a2: &Action, ins: InfosetId) -> Result<P> {
    let mut strength = P::zero();
    let mut never_worse = true;
    scan(tree, ins, a1, a2, |l1, l2| match compare(l1, l2)? {
        Ordering::Greater => {
            never_worse = false;
            Ok(ControlFlow::Break(()))
        }
        Ordering::Less => {
            let margin = l2.try_sub(l1)?.simplify();
            if margin > strength {
                strength = margin;
            }
            Ok(ControlFlow::Continue(()))
        }
        Ordering::Equal => Ok(ControlFlow::Continue(())),
    })?;
    Ok(if never_worse { strength } else { P::zero() })
}

fn other_actions<P: Probability>(tree: &Tree<P>, action: &Action, ins: InfosetId) -> Result<Vec<Action>> {
    let set = tree.arena().infoset(ins)?;
    if !set.has_action(action) {
        return Err(ContractViolation::UnknownAction {
            infoset: set.name().to_string(),
            action: action.to_string(),
        }
        .into());
    }
    Ok(set.actions().iter().filter(|a| *a != action).cloned().collect())
}

/// Whether some other action strictly dominates `action` at `ins`.
///
/// An information set whose dominance is already being decided further up
/// counts as undominated.
pub fn is_strictly_dominated<P: Probability>(tree: &Tree<P>, action: &Action, ins: InfosetId) -> Result<bool> {
    let memo = &tree.memo;
    if memo.in_progress.borrow().contains(&ins) {
        memo.guard_hits.set(memo.guard_hits.get() + 1);
        return Ok(false);
    }
    let memoize = tree.config().memoize;
    let key = (ins, action.clone());
    if memoize {
        if let Some(&dominated) = memo.dominated.borrow().get(&key) {
            return Ok(dominated);
        }
    }
    let hits_before = memo.guard_hits.get();
    let mut dominated = false;
    for other in other_actions(tree, action, ins)? {
        if strictly_dominates(tree, &other, action, ins)? {
            dominated = true;
            break;
        }
    }
    // verdicts that relied on the recursion guard depend on the call path
    if memoize && memo.guard_hits.get() == hits_before {
        memo.dominated.borrow_mut().insert(key, dominated);
    }
    Ok(dominated)
}

/// Whether some other action weakly dominates `action` at `ins`.
pub fn is_weakly_dominated<P: Probability>(tree: &Tree<P>, action: &Action, ins: InfosetId) -> Result<bool> {
    for other in other_actions(tree, action, ins)? {
        if weakly_dominates(tree, &other, action, ins)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// How far `action` falls short of the best alternative dominating it.
pub fn shortfall<P: Probability>(tree: &Tree<P>, action: &Action, ins: InfosetId) -> Result<P> {
    let mut worst = P::zero();
    for other in other_actions(tree, action, ins)? {
        let strength = domination_strength(tree, &other, action, ins)?;
        if strength > worst {
            worst = strength;
        }
    }
    Ok(worst)
}

/// The tree as seen by a player at `ins` who trusts everyone else not to
/// play strictly dominated actions.
///
/// Starting from the part of the tree consistent with reaching `ins`, every
/// strictly dominated action of every other information set is removed,
/// except the actions the anchor's player took on the way to `ins`, until no
/// further action can be removed. Each reduced information set is renamed
/// with the configured marker. The returned substitution maps the original
/// IDs into the reduced tree.
#[instrument(level = "debug", skip(tree), fields(tree = %tree.name()))]
pub fn trust_based_reduced_tree<P: Probability>(tree: &Tree<P>, ins: InfosetId) -> Result<(Tree<P>, Substitution)> {
    let anchor_name = tree.arena().infoset(ins)?.name().to_string();
    let (mut reduced, subs) = tree.clone_constrained(format!("{}_reduced_for_{}", tree.name(), anchor_name), ins)?;
    let anchor = subs
        .infoset(ins)
        .ok_or(ContractViolation::UnknownInformationSet(ins))?;
    let protected = reduced.arena().infoset_choice_history(anchor)?;
    let marker = reduced.config().reduction_marker.clone();

    let mut removed = 0usize;
    loop {
        let mut changed = false;
        let infosets = reduced.root_branch().information_sets();
        for other in infosets {
            if other == anchor {
                continue;
            }
            let candidates = reduced.arena().infoset(other)?.actions().to_vec();
            for action in candidates {
                if protected.contains(&(other, action.clone())) {
                    continue;
                }
                let set = reduced.arena().infoset(other)?;
                if !set.has_action(&action) || set.actions().len() < 2 {
                    continue;
                }
                if is_strictly_dominated(&reduced, &action, other)? {
                    let name = format!("{}{}", set.name(), marker);
                    debug!(infoset = %set.name(), %action, "removing strictly dominated action");
                    reduced.remove_action(other, &action)?;
                    reduced.rename_information_set(other, name)?;
                    removed += 1;
                    changed = true;
                }
            }
            if changed {
                break;
            }
        }
        if !changed {
            break;
        }
    }
    debug!(removed, "reduction reached its fixed point");
    Ok((reduced, subs))
}
