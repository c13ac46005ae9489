//! Named identity types: players, groups, actions, and outcomes
//!
//! These carry no behavior beyond their name. Two values are the same entity
//! exactly when their names (and, for outcomes, acceptability) agree, so they
//! can be cloned freely between trees.

use std::collections::BTreeSet;
use std::fmt;

/// An agent making decisions in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Player(String);

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Player(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable set of players, e.g. the group whose responsibility is assessed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Group {
    name: String,
    players: BTreeSet<Player>,
}

impl Group {
    pub fn new(name: impl Into<String>, players: impl IntoIterator<Item = Player>) -> Self {
        Group {
            name: name.into(),
            players: players.into_iter().collect(),
        }
    }

    /// The group containing only `player`, named after it.
    pub fn singleton(player: &Player) -> Self {
        Group::new(player.name(), [player.clone()])
    }

    pub fn empty() -> Self {
        Group::new("", [])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains(&self, player: &Player) -> bool {
        self.players.contains(player)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl From<&Player> for Group {
    fn from(player: &Player) -> Self {
        Group::singleton(player)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.players.iter().map(Player::name).collect();
        write!(f, "{}{{{}}}", self.name, names.join(", "))
    }
}

/// A choice label at decision nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Action(String);

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Action(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Create one action per name.
pub fn actions<const N: usize>(names: [&str; N]) -> [Action; N] {
    names.map(Action::new)
}

/// Create one player per name.
pub fn players<const N: usize>(names: [&str; N]) -> [Player; N] {
    names.map(Player::new)
}

/// A terminal result, either acceptable or not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Outcome {
    name: String,
    is_acceptable: bool,
}

impl Outcome {
    pub fn new(name: impl Into<String>, is_acceptable: bool) -> Self {
        Outcome {
            name: name.into(),
            is_acceptable,
        }
    }

    pub fn acceptable(name: impl Into<String>) -> Self {
        Outcome::new(name, true)
    }

    pub fn unacceptable(name: impl Into<String>) -> Self {
        Outcome::new(name, false)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_acceptable(&self) -> bool {
        self.is_acceptable
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.is_acceptable { '✔' } else { '✖' };
        write!(f, "{} {}", self.name, mark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_membership() {
        let [i, j, k] = players(["i", "j", "k"]);
        let g = Group::new("G", [i.clone(), j.clone()]);
        assert!(g.contains(&i));
        assert!(g.contains(&j));
        assert!(!g.contains(&k));
        assert_eq!(g.len(), 2);
        assert_eq!(g.to_string(), "G{i, j}");
    }

    #[test]
    fn test_identity_by_name() {
        assert_eq!(Action::new("C"), actions(["C"])[0]);
        assert_ne!(Outcome::acceptable("o"), Outcome::unacceptable("o"));
        assert_eq!(Outcome::unacceptable("bad").to_string(), "bad ✖");
    }
}
