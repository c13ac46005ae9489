//! Expectation and outcome-distribution evaluator
//!
//! Backward induction from a node down to the leaves under a partial
//! assignment of choices. Probability nodes are always integrated out; a
//! possibility or decision node follows its fixed successor if the assignment
//! has one and is otherwise resolved over all successors with [`Resolve`].
//!
//! Both evaluators walk the tree with an explicit stack, so tree depth is not
//! bounded by the call stack. Intermediate results are cached per tree and per
//! assignment when [`crate::config::EngineConfig::memoize`] is set.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{instrument, trace};

use crate::error::{ContractViolation, Result, StructuralViolation};
use crate::identity::{Action, Group, Outcome};
use crate::node::{InfosetId, Node, NodeId};
use crate::solution::{Scenario, Strategy, Transitions};
use crate::tree::{Branch, Tree};
use crate::value::Probability;

/// Probability of each outcome
pub type Distribution<P> = BTreeMap<Outcome, P>;

/// How an unfixed possibility or decision node aggregates its successors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolve {
    /// Worst case for a probability of something bad
    Max,
    /// Best case
    Min,
}

impl Resolve {
    pub fn pick<P: Probability>(self, values: impl IntoIterator<Item = P>) -> Option<P> {
        values.into_iter().reduce(|best, value| {
            let better = match self {
                Resolve::Max => value > best,
                Resolve::Min => value < best,
            };
            if better {
                value
            } else {
                best
            }
        })
    }
}

/// Leaf value an expectation is taken of.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// 1 for unacceptable outcomes, so the expectation is a likelihood of harm
    #[default]
    Unacceptable,
    Acceptable,
    /// 1 for exactly this outcome
    Is(Outcome),
}

impl Attribute {
    pub fn value<P: Probability>(&self, outcome: &Outcome) -> P {
        let hit = match self {
            Attribute::Unacceptable => !outcome.is_acceptable(),
            Attribute::Acceptable => outcome.is_acceptable(),
            Attribute::Is(o) => o == outcome,
        };
        if hit {
            P::one()
        } else {
            P::zero()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Context {
    transitions: Transitions,
    attribute: Attribute,
    resolve: Resolve,
}

/// Per-tree caches.
#[derive(Debug)]
pub(crate) struct Memo<P> {
    expectations: RefCell<HashMap<Context, HashMap<NodeId, P>>>,
    distributions: RefCell<HashMap<Transitions, HashMap<NodeId, Distribution<P>>>>,
    /// Strict-dominance verdicts per (information set, action)
    pub(crate) dominated: RefCell<HashMap<(InfosetId, Action), bool>>,
    /// Information sets whose dominance is currently being decided
    pub(crate) in_progress: RefCell<HashSet<InfosetId>>,
    /// Times a dominance query hit an information set in progress
    pub(crate) guard_hits: Cell<u64>,
}

impl<P> Default for Memo<P> {
    fn default() -> Self {
        Memo {
            expectations: RefCell::new(HashMap::new()),
            distributions: RefCell::new(HashMap::new()),
            dominated: RefCell::new(HashMap::new()),
            in_progress: RefCell::new(HashSet::new()),
            guard_hits: Cell::new(0),
        }
    }
}

impl<P> Memo<P> {
    pub(crate) fn clear(&self) {
        self.expectations.borrow_mut().clear();
        self.distributions.borrow_mut().clear();
        self.dominated.borrow_mut().clear();
    }
}

fn value_of<P: Clone>(values: &HashMap<NodeId, P>, id: NodeId) -> Result<P> {
    values
        .get(&id)
        .cloned()
        .ok_or_else(|| ContractViolation::UnknownNode(id).into())
}

impl<P: Probability> Tree<P> {
    /// Successor fixed for `node` by `transitions`, directly or through its
    /// information set. Probability nodes are never fixed.
    fn fixed_successor(&self, node: &Node<P>, transitions: &Transitions) -> Result<Option<NodeId>> {
        let id = node.id();
        let fixed = match node {
            Node::Possibility { .. } => transitions.successor(id),
            Node::Decision { infoset, .. } => match transitions.successor(id) {
                Some(s) => Some(s),
                None => match transitions.action(*infoset) {
                    Some(action) => Some(node.consequence(action).ok_or_else(|| {
                        ContractViolation::UnknownAction {
                            infoset: self
                                .arena()
                                .information_set(*infoset)
                                .map(|s| s.name().to_string())
                                .unwrap_or_default(),
                            action: action.to_string(),
                        }
                    })?),
                    None => None,
                },
            },
            Node::Probability { .. } | Node::Outcome { .. } => None,
        };
        if let Some(s) = fixed {
            if !node.children().contains(&s) {
                return Err(ContractViolation::NotASuccessor {
                    node: self.arena().label(id),
                    successor: s,
                }
                .into());
            }
        }
        Ok(fixed)
    }

    fn successors_to_visit(&self, node: &Node<P>, transitions: &Transitions) -> Result<Vec<NodeId>> {
        Ok(match self.fixed_successor(node, transitions)? {
            Some(s) => vec![s],
            None => node.children().to_vec(),
        })
    }

    fn cached_expectation(&self, context: &Context, id: NodeId) -> Option<P> {
        if !self.config().memoize {
            return None;
        }
        let hit = self
            .memo
            .expectations
            .borrow()
            .get(context)
            .and_then(|values| values.get(&id).cloned());
        if hit.is_some() {
            trace!(node = id, "expectation memo hit");
        }
        hit
    }

    /// Expectation of `attribute` at `start` with `transitions` fixed and
    /// everything else resolved by `resolve`.
    pub(crate) fn expectation_at(
        &self,
        start: NodeId,
        transitions: &Transitions,
        attribute: &Attribute,
        resolve: Resolve,
    ) -> Result<P> {
        let context = Context {
            transitions: transitions.clone(),
            attribute: attribute.clone(),
            resolve,
        };
        let mut values: HashMap<NodeId, P> = HashMap::new();
        let mut stack = vec![(start, false)];
        while let Some((id, expanded)) = stack.pop() {
            if values.contains_key(&id) {
                continue;
            }
            let node = self.arena().node(id)?;
            if !expanded {
                if let Some(value) = self.cached_expectation(&context, id) {
                    values.insert(id, value);
                    continue;
                }
                stack.push((id, true));
                for child in self.successors_to_visit(node, transitions)? {
                    if !values.contains_key(&child) {
                        stack.push((child, false));
                    }
                }
                continue;
            }
            let value = match node {
                Node::Outcome { outcome, .. } => attribute.value::<P>(outcome),
                Node::Probability {
                    children,
                    probabilities,
                    ..
                } => {
                    let mut sum = P::zero();
                    for (child, p) in children.iter().zip(probabilities) {
                        sum = sum.try_add(&p.try_mul(&value_of(&values, *child)?)?)?;
                    }
                    sum.simplify()
                }
                _ => match self.fixed_successor(node, transitions)? {
                    Some(s) => value_of(&values, s)?,
                    None => {
                        let successors = node
                            .children()
                            .iter()
                            .map(|&c| value_of(&values, c))
                            .collect::<Result<Vec<P>>>()?;
                        resolve
                            .pick(successors)
                            .ok_or_else(|| StructuralViolation::NoSuccessors(self.arena().label(id)))?
                    }
                },
            };
            values.insert(id, value);
        }
        let result = value_of(&values, start)?;
        if self.config().memoize {
            self.memo
                .expectations
                .borrow_mut()
                .entry(context)
                .or_default()
                .extend(values);
        }
        Ok(result)
    }

    /// Full outcome distribution at `start`; every possibility and decision
    /// node on the way must be fixed by `transitions`.
    pub(crate) fn distribution_at(&self, start: NodeId, transitions: &Transitions) -> Result<Distribution<P>> {
        let memoize = self.config().memoize;
        let mut values: HashMap<NodeId, Distribution<P>> = HashMap::new();
        let mut stack = vec![(start, false)];
        while let Some((id, expanded)) = stack.pop() {
            if values.contains_key(&id) {
                continue;
            }
            let node = self.arena().node(id)?;
            if !expanded {
                let hit = memoize
                    .then(|| {
                        self.memo
                            .distributions
                            .borrow()
                            .get(transitions)
                            .and_then(|d| d.get(&id).cloned())
                    })
                    .flatten();
                if let Some(distribution) = hit {
                    trace!(node = id, "distribution memo hit");
                    values.insert(id, distribution);
                    continue;
                }
                stack.push((id, true));
                let next = match node {
                    Node::Probability { children, .. } => children.clone(),
                    Node::Outcome { .. } => Vec::new(),
                    _ => match self.fixed_successor(node, transitions)? {
                        Some(s) => vec![s],
                        None => {
                            return Err(ContractViolation::UnresolvedNode(self.arena().label(id)).into())
                        }
                    },
                };
                stack.extend(next.into_iter().map(|c| (c, false)));
                continue;
            }
            let distribution = match node {
                Node::Outcome { outcome, .. } => Distribution::from([(outcome.clone(), P::one())]),
                Node::Probability {
                    children,
                    probabilities,
                    ..
                } => {
                    let mut merged = Distribution::new();
                    for (child, p) in children.iter().zip(probabilities) {
                        if p.is_zero() {
                            continue;
                        }
                        let below = values
                            .get(child)
                            .ok_or(ContractViolation::UnknownNode(*child))?;
                        for (outcome, q) in below {
                            let entry = merged.entry(outcome.clone()).or_insert_with(P::zero);
                            *entry = entry.try_add(&p.try_mul(q)?)?;
                        }
                    }
                    merged.into_iter().map(|(o, p)| (o, p.simplify())).collect()
                }
                _ => match self.fixed_successor(node, transitions)? {
                    Some(s) => value_of(&values, s)?,
                    None => return Err(ContractViolation::UnresolvedNode(self.arena().label(id)).into()),
                },
            };
            values.insert(id, distribution);
        }
        let result = value_of(&values, start)?;
        if memoize {
            self.memo
                .distributions
                .borrow_mut()
                .entry(transitions.clone())
                .or_default()
                .extend(values);
        }
        Ok(result)
    }
}

impl<'t, P: Probability> Branch<'t, P> {
    /// Merge a scenario anchored at `node` with a strategy.
    fn combine(&self, node: NodeId, scenario: Option<&Scenario>, strategy: Option<&Strategy>) -> Result<Transitions> {
        self.ensure_within(node)?;
        let arena = self.arena();
        let mut transitions = match scenario {
            Some(scenario) if scenario.current_node() != node => {
                return Err(ContractViolation::AnchorMismatch {
                    anchor: arena.label(scenario.current_node()),
                    node: arena.label(node),
                }
                .into())
            }
            Some(scenario) => scenario.transitions().clone(),
            None => Transitions::new(),
        };
        if let Some(strategy) = strategy {
            transitions = transitions.disjoint_union(&strategy.to_transitions(), arena)?;
        }
        Ok(transitions)
    }

    /// Expectation of `attribute` at `node` under an arbitrary assignment.
    pub fn expectation(
        &self,
        node: NodeId,
        transitions: &Transitions,
        attribute: &Attribute,
        resolve: Resolve,
    ) -> Result<P> {
        self.ensure_within(node)?;
        transitions.validate(self.arena())?;
        self.tree.expectation_at(node, transitions, attribute, resolve)
    }

    pub fn get_expectation(
        &self,
        node: NodeId,
        scenario: Option<&Scenario>,
        strategy: Option<&Strategy>,
        attribute: &Attribute,
        resolve: Resolve,
    ) -> Result<P> {
        let transitions = self.combine(node, scenario, strategy)?;
        self.tree.expectation_at(node, &transitions, attribute, resolve)
    }

    /// Probability of an unacceptable outcome
    pub fn get_likelihood(
        &self,
        node: NodeId,
        scenario: Option<&Scenario>,
        strategy: Option<&Strategy>,
        resolve: Resolve,
    ) -> Result<P> {
        self.get_expectation(node, scenario, strategy, &Attribute::Unacceptable, resolve)
    }

    pub fn outcome_distribution(&self, node: NodeId, transitions: &Transitions) -> Result<Distribution<P>> {
        self.ensure_within(node)?;
        transitions.validate(self.arena())?;
        self.tree.distribution_at(node, transitions)
    }

    /// Outcome distribution under a scenario and a strategy that together
    /// resolve every possibility and decision node reached.
    pub fn get_outcome_distribution(
        &self,
        node: NodeId,
        scenario: Option<&Scenario>,
        strategy: Option<&Strategy>,
    ) -> Result<Distribution<P>> {
        let transitions = self.combine(node, scenario, strategy)?;
        self.tree.distribution_at(node, &transitions)
    }

    /// Smallest worst-case likelihood over `strategies`, each merged with `base`.
    fn minimize(
        &self,
        node: NodeId,
        group: &Group,
        base: &Transitions,
        strategies: impl Iterator<Item = Strategy>,
    ) -> Result<P> {
        let mut best: Option<P> = None;
        let mut count = 0usize;
        for strategy in strategies {
            count += 1;
            let transitions = base.disjoint_union(&strategy.to_transitions(), self.arena())?;
            let value = self
                .tree
                .expectation_at(node, &transitions, &Attribute::Unacceptable, Resolve::Max)?;
            if best.as_ref().map_or(true, |b| value < *b) {
                best = Some(value);
            }
        }
        trace!(strategies = count, "minimized over strategies");
        best.ok_or_else(|| {
            ContractViolation::NoConsistentStrategy {
                group: group.to_string(),
                node: self.arena().label(node),
            }
            .into()
        })
    }

    /// γ: the likelihood `group` can guarantee at `node` against any
    /// behaviour of nature and the other players.
    #[instrument(level = "debug", skip(self, group), fields(group = %group))]
    pub fn get_guaranteed_likelihood(&self, node: NodeId, group: &Group) -> Result<P> {
        self.ensure_within(node)?;
        let strategies = self.get_strategies(node, group)?;
        self.minimize(node, group, &Transitions::new(), strategies)
    }

    /// ω: the smallest likelihood `group` can achieve once `scenario` is known.
    #[instrument(level = "debug", skip(self, group), fields(group = %group))]
    pub fn get_optimal_avoidance_likelihood(&self, scenario: &Scenario, group: &Group) -> Result<P> {
        let node = scenario.current_node();
        self.ensure_within(node)?;
        let strategies = self.get_strategies(node, group)?;
        self.minimize(node, group, scenario.transitions(), strategies)
    }

    /// How much ω rises when `action` is taken at the scenario's anchor.
    pub fn delta_optimal_avoidance_likelihood(
        &self,
        scenario: &Scenario,
        group: &Group,
        action: &Action,
    ) -> Result<P> {
        let after = scenario.sub_scenario(self.arena(), action)?;
        let before = self.get_optimal_avoidance_likelihood(scenario, group)?;
        let after = self.get_optimal_avoidance_likelihood(&after, group)?;
        Ok(after.try_sub(&before)?.simplify())
    }

    /// Smallest likelihood all players of the branch can reach together at
    /// `node`, holding `fixed_choices`. Without `env_scenario` nature is
    /// resolved by max.
    #[instrument(level = "debug", skip(self))]
    pub fn cooperatively_achievable_likelihood(
        &self,
        node: NodeId,
        env_scenario: Option<&Scenario>,
        fixed_choices: &BTreeMap<InfosetId, Action>,
    ) -> Result<P> {
        let base = self.combine(node, env_scenario, None)?;
        let fixed = Strategy::new(self.arena(), fixed_choices.clone(), None)?.to_transitions();
        let everyone = self.all_players();
        // fixed choices come back inside every enumerated strategy
        let strategies = self.get_strategies_fixing(node, &everyone, &fixed)?;
        self.minimize(node, &everyone, &base, strategies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::error::Error;
    use crate::identity::players;
    use crate::test_tree;
    use crate::value::{ratio, Rational};
    use rstest::rstest;

    #[test]
    fn test_worst_case_picks_bad_branch() {
        let tree = test_tree::single_decision().unwrap();
        let branch = tree.root_branch();
        let v = tree.root();
        assert_eq!(branch.get_likelihood(v, None, None, Resolve::Max).unwrap(), ratio(1, 1));
        assert_eq!(branch.get_likelihood(v, None, None, Resolve::Min).unwrap(), ratio(0, 1));
        let acceptable = branch
            .get_expectation(v, None, None, &Attribute::Acceptable, Resolve::Max)
            .unwrap();
        assert_eq!(acceptable, ratio(1, 1));
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn test_probability_weighting(#[case] memoize: bool) {
        let tree = test_tree::climate_learning()
            .unwrap()
            .with_config(EngineConfig::default().with_memoize(memoize));
        let branch = tree.root_branch();
        let unknown = branch.information_set_by_name("unknown_risk").unwrap();
        let unlearned = branch.information_set_by_name("unlearned_risk").unwrap();
        let strategy = Strategy::new(
            tree.arena(),
            BTreeMap::from([
                (unknown, Action::new("dont_learn")),
                (unlearned, Action::new("heat")),
            ]),
            None,
        )
        .unwrap();
        let root = tree.root();
        for _ in 0..2 {
            let l = branch.get_likelihood(root, None, Some(&strategy), Resolve::Max).unwrap();
            assert_eq!(l, ratio(1, 3));
        }
        let too_warm = Attribute::Is(Outcome::unacceptable("too_warm"));
        let l = branch
            .get_expectation(root, None, Some(&strategy), &too_warm, Resolve::Max)
            .unwrap();
        assert_eq!(l, ratio(1, 3));
    }

    #[test]
    fn test_outcome_distribution_requires_full_resolution() {
        let tree = test_tree::climate_learning().unwrap();
        let branch = tree.root_branch();
        let root = tree.root();
        let ins = |name: &str| branch.information_set_by_name(name).unwrap();
        let partial = Strategy::new(
            tree.arena(),
            BTreeMap::from([(ins("unknown_risk"), Action::new("dont_learn"))]),
            None,
        )
        .unwrap();
        let err = branch
            .get_outcome_distribution(root, None, Some(&partial))
            .unwrap_err();
        assert!(matches!(err, Error::Contract(ContractViolation::UnresolvedNode(_))));

        let full = Strategy::new(
            tree.arena(),
            BTreeMap::from([
                (ins("unknown_risk"), Action::new("dont_learn")),
                (ins("unlearned_risk"), Action::new("dont_heat")),
            ]),
            None,
        )
        .unwrap();
        let distribution = branch.get_outcome_distribution(root, None, Some(&full)).unwrap();
        assert_eq!(distribution.len(), 2);
        assert_eq!(distribution[&Outcome::acceptable("climate_ok")], ratio(1, 3));
        assert_eq!(distribution[&Outcome::unacceptable("too_cold")], ratio(2, 3));
    }

    #[test]
    fn test_guaranteed_likelihood() {
        let tree = test_tree::forward_trust().unwrap();
        let branch = tree.root_branch();
        let [i, j] = players(["i", "j"]);
        let gi = Group::singleton(&i);
        assert_eq!(branch.get_guaranteed_likelihood(tree.root(), &gi).unwrap(), ratio(0, 1));
        let v1d = branch.node_by_name("v1D").unwrap();
        assert_eq!(branch.get_guaranteed_likelihood(v1d, &gi).unwrap(), ratio(1, 1));
        let gj = Group::singleton(&j);
        assert_eq!(branch.get_guaranteed_likelihood(v1d, &gj).unwrap(), ratio(0, 1));

        let climate = test_tree::climate_learning().unwrap();
        let humanity = Group::singleton(&i);
        assert_eq!(
            climate
                .root_branch()
                .get_guaranteed_likelihood(climate.root(), &humanity)
                .unwrap(),
            ratio(0, 1)
        );
    }

    #[test]
    fn test_optimal_avoidance_after_scenario() {
        let tree = test_tree::forward_trust().unwrap();
        let branch = tree.root_branch();
        let [i, _] = players(["i", "j"]);
        let gi = Group::singleton(&i);
        let v1 = branch.node_by_name("v1").unwrap();
        let v1d = branch.node_by_name("v1D").unwrap();
        let ins_v1d = tree.node(v1d).unwrap().infoset().unwrap();

        // j would defect after D
        let scenario = Scenario::new(
            tree.arena(),
            v1,
            Transitions::new().with_action(ins_v1d, Action::new("D")),
        )
        .unwrap();
        assert_eq!(branch.get_optimal_avoidance_likelihood(&scenario, &gi).unwrap(), ratio(0, 1));
        let delta = branch
            .delta_optimal_avoidance_likelihood(&scenario, &gi, &Action::new("D"))
            .unwrap();
        assert_eq!(delta, ratio(1, 1));
        let delta = branch
            .delta_optimal_avoidance_likelihood(&scenario, &gi, &Action::new("C"))
            .unwrap();
        assert_eq!(delta, ratio(0, 1));
    }

    #[test]
    fn test_cooperative_likelihood_with_fixed_choice() {
        let tree = test_tree::forward_trust().unwrap();
        let branch = tree.root_branch();
        let v1 = branch.node_by_name("v1").unwrap();
        let ins_v1 = tree.node(v1).unwrap().infoset().unwrap();
        let free = branch
            .cooperatively_achievable_likelihood(v1, None, &BTreeMap::new())
            .unwrap();
        assert_eq!(free, ratio(0, 1));
        let after_d = BTreeMap::from([(ins_v1, Action::new("D"))]);
        let fixed = branch.cooperatively_achievable_likelihood(v1, None, &after_d).unwrap();
        assert_eq!(fixed, ratio(0, 1));
        let ins_v1d = branch.information_set_by_name("ins_v1D").unwrap();
        let both_defect = BTreeMap::from([(ins_v1, Action::new("D")), (ins_v1d, Action::new("D"))]);
        let fixed = branch.cooperatively_achievable_likelihood(v1, None, &both_defect).unwrap();
        assert_eq!(fixed, ratio(1, 1));
        // nature at v0 is resolved by max
        let root = branch
            .cooperatively_achievable_likelihood(tree.root(), None, &BTreeMap::new())
            .unwrap();
        assert_eq!(root, ratio(0, 1));
    }

    #[test]
    fn test_overlapping_scenario_and_strategy_rejected() {
        let tree = test_tree::single_decision().unwrap();
        let v = tree.root();
        let ins = tree.node(v).unwrap().infoset().unwrap();
        let scenario = Scenario::new(tree.arena(), v, Transitions::new().with_action(ins, Action::new("a")))
            .unwrap();
        let strategy = Strategy::new(tree.arena(), BTreeMap::from([(ins, Action::new("b"))]), None).unwrap();
        let err = tree
            .root_branch()
            .get_likelihood(v, Some(&scenario), Some(&strategy), Resolve::Max)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Contract(ContractViolation::OverlappingInformationSet(_))
        ));
    }

    #[test]
    fn test_scenario_must_be_anchored_at_start() {
        let tree = test_tree::forward_trust().unwrap();
        let branch = tree.root_branch();
        let v1 = branch.node_by_name("v1").unwrap();
        let scenario = Scenario::empty_at(v1);
        let err = branch
            .get_likelihood(tree.root(), Some(&scenario), None, Resolve::Max)
            .unwrap_err();
        assert!(matches!(err, Error::Contract(ContractViolation::AnchorMismatch { .. })));
    }

    #[test]
    fn test_f64_backend() {
        let tree = test_tree::dominance_f64().unwrap();
        let branch = tree.root_branch();
        let l: f64 = branch.get_likelihood(tree.root(), None, None, Resolve::Max).unwrap();
        assert!((l - 0.6).abs() < 1e-10);
        let l: f64 = branch.get_likelihood(tree.root(), None, None, Resolve::Min).unwrap();
        assert!((l - 0.2).abs() < 1e-10);
    }

    #[test]
    fn test_resolve_pick() {
        let values = [ratio(1, 3), ratio(1, 2), ratio(1, 4)];
        assert_eq!(Resolve::Max.pick(values), Some(ratio(1, 2)));
        assert_eq!(Resolve::Min.pick(values), Some(ratio(1, 4)));
        assert_eq!(Resolve::Max.pick(Vec::<Rational>::new()), None);
    }

    #[test]
    fn test_long_lottery_chain_stays_exact() {
        let tree = test_tree::prime_lotteries(50).unwrap();
        let l = tree
            .root_branch()
            .get_likelihood(tree.root(), None, None, Resolve::Max)
            .unwrap();
        let mut survive = Rational::one();
        for p in test_tree::primes_below(50) {
            survive = survive * ratio(p - 1, p);
        }
        assert_eq!(l, Rational::one() - survive);
    }

    #[test]
    fn test_lottery_chain_beyond_exact_range_is_an_error() {
        let tree = test_tree::prime_lotteries(400).unwrap();
        assert_eq!(tree.root_branch().probability_nodes().len(), 78);
        let err = tree
            .root_branch()
            .get_likelihood(tree.root(), None, None, Resolve::Max)
            .unwrap_err();
        assert!(matches!(err, Error::Overflow(_)));
        let err = tree.root_branch().get_outcome_distribution(tree.root(), None, None).unwrap_err();
        assert!(matches!(err, Error::Overflow(_)));
    }
}
