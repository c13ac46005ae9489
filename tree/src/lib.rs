//! culpa Tree Builder - name-keyed tree construction
//!
//! [`TreeBuilder`] wraps an engine [`Arena`] and a [`Registry`] mapping names
//! to players, actions, outcomes, information sets and nodes. Entities are
//! created on first use of a name and returned unchanged afterwards, so a
//! problem description can refer to everything by name. [`TreeBuilder::build`]
//! hands back the finished [`Tree`] together with the registry.

use std::collections::{BTreeMap, BTreeSet};

use culpa_engine::arena::Arena;
use culpa_engine::{Action, InfosetId, NodeId, Outcome, Player, Probability, Rational, Tree};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("{kind} '{name}' is already registered")]
    DuplicateName { kind: &'static str, name: String },

    #[error("malformed simultaneous move '{name}': {reason}")]
    MalformedSimultaneousMove { name: String, reason: String },

    #[error(transparent)]
    Engine(#[from] culpa_engine::Error),
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;

/// Names of everything a [`TreeBuilder`] has created.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    players: BTreeMap<String, Player>,
    actions: BTreeMap<String, Action>,
    outcomes: BTreeMap<String, Outcome>,
    information_sets: BTreeMap<String, InfosetId>,
    nodes: BTreeMap<String, NodeId>,
}

impl Registry {
    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.get(name)
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    pub fn outcome(&self, name: &str) -> Option<&Outcome> {
        self.outcomes.get(name)
    }

    pub fn information_set(&self, name: &str) -> Option<InfosetId> {
        self.information_sets.get(name).copied()
    }

    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.nodes.get(name).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.nodes.iter().map(|(name, id)| (name.as_str(), *id))
    }
}

/// Incremental, leaves-first tree construction keyed by name.
#[derive(Debug, Clone)]
pub struct TreeBuilder<P = Rational> {
    arena: Arena<P>,
    registry: Registry,
}

impl<P: Probability> Default for TreeBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Probability> TreeBuilder<P> {
    pub fn new() -> Self {
        TreeBuilder {
            arena: Arena::new(),
            registry: Registry::default(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn arena(&self) -> &Arena<P> {
        &self.arena
    }

    pub fn player(&mut self, name: &str) -> Player {
        self.registry
            .players
            .entry(name.to_string())
            .or_insert_with(|| Player::new(name))
            .clone()
    }

    pub fn players<const N: usize>(&mut self, names: [&str; N]) -> [Player; N] {
        names.map(|name| self.player(name))
    }

    pub fn action(&mut self, name: &str) -> Action {
        self.registry
            .actions
            .entry(name.to_string())
            .or_insert_with(|| Action::new(name))
            .clone()
    }

    pub fn actions<const N: usize>(&mut self, names: [&str; N]) -> [Action; N] {
        names.map(|name| self.action(name))
    }

    /// Get or create an outcome. Reusing a name with the other acceptability is an error.
    pub fn outcome(&mut self, name: &str, is_acceptable: bool) -> BuildResult<Outcome> {
        match self.registry.outcomes.get(name) {
            Some(existing) if existing.is_acceptable() != is_acceptable => Err(BuildError::DuplicateName {
                kind: "outcome",
                name: name.to_string(),
            }),
            Some(existing) => Ok(existing.clone()),
            None => {
                let outcome = Outcome::new(name, is_acceptable);
                self.registry.outcomes.insert(name.to_string(), outcome.clone());
                Ok(outcome)
            }
        }
    }

    pub fn information_set(&mut self, name: &str) -> InfosetId {
        if let Some(id) = self.registry.information_sets.get(name) {
            return *id;
        }
        let id = self.arena.add_information_set(name);
        self.registry.information_sets.insert(name.to_string(), id);
        id
    }

    fn claim_node_name(&self, name: &str) -> BuildResult<()> {
        if !name.is_empty() && self.registry.nodes.contains_key(name) {
            return Err(BuildError::DuplicateName {
                kind: "node",
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn register_node(&mut self, name: &str, id: NodeId) {
        if !name.is_empty() {
            self.registry.nodes.insert(name.to_string(), id);
        }
    }

    pub fn outcome_node(&mut self, name: &str, outcome: &Outcome) -> BuildResult<NodeId> {
        self.claim_node_name(name)?;
        let id = self.arena.add_outcome_node(name, outcome.clone());
        self.register_node(name, id);
        Ok(id)
    }

    pub fn possibility(&mut self, name: &str, successors: Vec<(NodeId, Option<String>)>) -> BuildResult<NodeId> {
        self.claim_node_name(name)?;
        let id = self.arena.add_possibility_node(name, successors)?;
        self.register_node(name, id);
        Ok(id)
    }

    pub fn probability(&mut self, name: &str, successors: Vec<(NodeId, P)>) -> BuildResult<NodeId> {
        self.claim_node_name(name)?;
        let id = self.arena.add_probability_node(name, successors)?;
        self.register_node(name, id);
        Ok(id)
    }

    /// Add a decision node. Without `infoset` the node gets its own
    /// information set, registered under the name the arena gives it.
    pub fn decision(
        &mut self,
        name: &str,
        player: &Player,
        infoset: Option<InfosetId>,
        consequences: Vec<(Action, NodeId)>,
    ) -> BuildResult<NodeId> {
        self.claim_node_name(name)?;
        let id = self.arena.add_decision_node(name, player.clone(), infoset, consequences)?;
        self.register_node(name, id);
        if infoset.is_none() {
            if let Some(ins) = self.arena.node(id)?.infoset() {
                let ins_name = self.arena.infoset(ins)?.name().to_string();
                self.registry.information_sets.entry(ins_name).or_insert(ins);
            }
        }
        Ok(id)
    }

    /// Build the decision nodes of players moving without observing each other.
    ///
    /// `consequences` maps each action tuple, ordered like `players`, to its
    /// successor. The first player decides at `name`; every later player decides
    /// at one node per combination of earlier actions (named `{name}_{action}..`),
    /// all in one information set per player. Missing entries of `infosets`
    /// default to `S_{name}_{player}`. Returns the first player's node.
    pub fn simultaneous_move(
        &mut self,
        name: &str,
        players: &[Player],
        infosets: &[Option<InfosetId>],
        consequences: Vec<(Vec<Action>, NodeId)>,
    ) -> BuildResult<NodeId> {
        let malformed = |reason: String| BuildError::MalformedSimultaneousMove {
            name: name.to_string(),
            reason,
        };
        if players.is_empty() {
            return Err(malformed("no players".into()));
        }
        if !infosets.is_empty() && infosets.len() != players.len() {
            return Err(malformed(format!(
                "{} information sets given for {} players",
                infosets.len(),
                players.len()
            )));
        }
        if let Some((tuple, _)) = consequences.iter().find(|(tuple, _)| tuple.len() != players.len()) {
            return Err(malformed(format!(
                "action combination of length {} for {} players",
                tuple.len(),
                players.len()
            )));
        }
        let tuples: Vec<&[Action]> = consequences.iter().map(|(tuple, _)| tuple.as_slice()).collect();
        if tuples.iter().collect::<BTreeSet<_>>().len() != tuples.len() {
            return Err(malformed("repeated action combination".into()));
        }
        if !is_full_product(&tuples) {
            return Err(malformed("action combinations are not a full product".into()));
        }

        let infosets: Vec<InfosetId> = players
            .iter()
            .enumerate()
            .map(|(pos, player)| match infosets.get(pos).copied().flatten() {
                Some(id) => id,
                None => self.information_set(&format!("S_{name}_{player}")),
            })
            .collect();
        debug!(node = %name, players = players.len(), combinations = consequences.len(), "simultaneous move");
        self.move_chain(name, players, &infosets, consequences)
    }

    fn move_chain(
        &mut self,
        name: &str,
        players: &[Player],
        infosets: &[InfosetId],
        consequences: Vec<(Vec<Action>, NodeId)>,
    ) -> BuildResult<NodeId> {
        if players.len() == 1 {
            let choices = consequences
                .into_iter()
                .filter_map(|(mut tuple, node)| tuple.pop().map(|a| (a, node)))
                .collect();
            return self.decision(name, &players[0], Some(infosets[0]), choices);
        }
        let mut grouped: Vec<(Action, Vec<(Vec<Action>, NodeId)>)> = Vec::new();
        for (tuple, node) in consequences {
            let mut rest = tuple.into_iter();
            let Some(first) = rest.next() else { continue };
            let entry = (rest.collect(), node);
            match grouped.iter_mut().find(|(a, _)| *a == first) {
                Some((_, group)) => group.push(entry),
                None => grouped.push((first, vec![entry])),
            }
        }
        let mut choices = Vec::with_capacity(grouped.len());
        for (first, rest) in grouped {
            let sub_name = format!("{name}_{first}");
            let sub = self.move_chain(&sub_name, &players[1..], &infosets[1..], rest)?;
            choices.push((first, sub));
        }
        self.decision(name, &players[0], Some(infosets[0]), choices)
    }

    /// Finish the tree rooted at `root`.
    pub fn build(self, name: &str, root: NodeId) -> BuildResult<(Tree<P>, Registry)> {
        let tree = Tree::new(name, self.arena, root)?;
        debug!(tree = name, nodes = tree.arena().len(), "built tree");
        Ok((tree, self.registry))
    }
}

/// Whether every first action is followed by the same set of remaining
/// combinations, recursively.
fn is_full_product(tuples: &[&[Action]]) -> bool {
    if tuples.first().map_or(true, |t| t.len() <= 1) {
        return true;
    }
    let rest: BTreeSet<&[Action]> = tuples.iter().map(|t| &t[1..]).collect();
    let firsts: BTreeSet<&Action> = tuples.iter().map(|t| &t[0]).collect();
    let uniform = firsts.iter().all(|first| {
        let after: BTreeSet<&[Action]> = tuples
            .iter()
            .filter(|t| &&t[0] == first)
            .map(|t| &t[1..])
            .collect();
        after == rest
    });
    uniform && is_full_product(&rest.into_iter().collect::<Vec<_>>())
}
