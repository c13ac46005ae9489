//! Hand-built fixture trees shared by unit tests, benches and the CLI
//!
//! forward_trust:
//!   v0
//!   ├─╴v1: i
//!   │  ├─╴C╶─╴v1C: j
//!   │  │      ├─╴C╶─╴w1CC: good ✔
//!   │  │      ╰─╴D╶─╴w1CD: good ✔
//!   │  ╰─╴D╶─╴v1D: j
//!   │         ├─╴C╶─╴w1DC: good ✔
//!   │         ╰─╴D╶─╴w1DD: bad ✖
//!   ╰─╴v2: i
//!      ├─╴C╶─╴v2C (S2i): j
//!      │      ├─╴C╶─╴w2CC: good ✔
//!      │      ╰─╴D╶─╴w2CD: good ✔
//!      ╰─╴D╶─╴v2D (S2i): j
//!             ├─╴C╶─╴w2DC: good ✔
//!             ╰─╴D╶─╴w2DD: bad ✖
//!
//! climate_learning: nature picks a risk of warming (1/3) or cooling (2/3).
//! Humanity (i) does not know which and may learn it before deciding whether
//! to heat. Without learning, the two heating decisions share `unlearned_risk`.
//!
//! dominance: i cannot tell v1 from v2 (information set `S`). Action `a`
//! leads to harm with probability 1/5 everywhere, `b` with 3/5, whatever j
//! does after `a` at v2.
//!
//! trusted_history:
//!   r
//!   ├─╴t1 (T): i
//!   │   ├─╴x╶─╴a1 (A): i
//!   │   │       ├─╴c╶─╴a1c: bad ✖
//!   │   │       ╰─╴d╶─╴a1d: bad ✖
//!   │   ╰─╴y╶─╴b1: good ✔
//!   ╰─╴t2 (T): i
//!       ├─╴x╶─╴b2: bad ✖
//!       ╰─╴y╶─╴a2 (A): i
//!               ├─╴c╶─╴a2c: good ✔
//!               ╰─╴d╶─╴a2d: good ✔
//!
//! `y` strictly dominates `x` at `T`, yet i reaches `A` by either action.

use crate::arena::Arena;
use crate::error::Result;
use crate::identity::{actions, players, Action, Outcome, Player};
use crate::node::NodeId;
use crate::tree::Tree;
use crate::value::{ratio, Probability, Rational};

/// Fixture names accepted by [`by_name`]
pub const FIXTURES: [&str; 5] = [
    "forward_trust",
    "climate_learning",
    "single_decision",
    "dominance",
    "trusted_history",
];

/// Build a fixture by name.
pub fn by_name(name: &str) -> Option<Result<Tree>> {
    match name {
        "forward_trust" => Some(forward_trust()),
        "climate_learning" => Some(climate_learning()),
        "single_decision" => Some(single_decision()),
        "dominance" => Some(dominance()),
        "trusted_history" => Some(trusted_history()),
        _ => None,
    }
}

pub fn forward_trust() -> Result<Tree> {
    let mut arena = Arena::<Rational>::new();
    let [i, j] = players(["i", "j"]);
    let [c, d] = actions(["C", "D"]);
    let good = Outcome::acceptable("good");
    let bad = Outcome::unacceptable("bad");

    let leaf = |arena: &mut Arena<Rational>, name: &str, outcome: &Outcome| {
        arena.add_outcome_node(name, outcome.clone())
    };
    let w1cc = leaf(&mut arena, "w1CC", &good);
    let w1cd = leaf(&mut arena, "w1CD", &good);
    let w1dc = leaf(&mut arena, "w1DC", &good);
    let w1dd = leaf(&mut arena, "w1DD", &bad);
    let w2cc = leaf(&mut arena, "w2CC", &good);
    let w2cd = leaf(&mut arena, "w2CD", &good);
    let w2dc = leaf(&mut arena, "w2DC", &good);
    let w2dd = leaf(&mut arena, "w2DD", &bad);

    let v1c = arena.add_decision_node("v1C", j.clone(), None, vec![(c.clone(), w1cc), (d.clone(), w1cd)])?;
    let v1d = arena.add_decision_node("v1D", j.clone(), None, vec![(c.clone(), w1dc), (d.clone(), w1dd)])?;
    let v1 = arena.add_decision_node("v1", i.clone(), None, vec![(c.clone(), v1c), (d.clone(), v1d)])?;

    let s2i = arena.add_information_set("S2i");
    let v2c = arena.add_decision_node("v2C", j.clone(), Some(s2i), vec![(c.clone(), w2cc), (d.clone(), w2cd)])?;
    let v2d = arena.add_decision_node("v2D", j, Some(s2i), vec![(c.clone(), w2dc), (d.clone(), w2dd)])?;
    let v2 = arena.add_decision_node("v2", i, None, vec![(c, v2c), (d, v2d)])?;

    let v0 = arena.add_possibility_node("v0", vec![(v1, None), (v2, None)])?;
    Tree::new("forward_trust", arena, v0)
}

pub fn climate_learning() -> Result<Tree> {
    let mut arena = Arena::<Rational>::new();
    let i = Player::new("i");
    let [learn, dont_learn, heat, dont_heat] = actions(["learn", "dont_learn", "heat", "dont_heat"]);
    let ok = Outcome::acceptable("climate_ok");
    let too_warm = Outcome::unacceptable("too_warm");
    let too_cold = Outcome::unacceptable("too_cold");

    let unknown_risk = arena.add_information_set("unknown_risk");
    let unlearned_risk = arena.add_information_set("unlearned_risk");

    let v7 = arena.add_outcome_node("v7_warming_knowingly_prevented", ok.clone());
    let v8 = arena.add_outcome_node("v8_warming_knowingly_allowed", too_warm.clone());
    let v3 = arena.add_decision_node(
        "v3_known_warming",
        i.clone(),
        None,
        vec![(dont_heat.clone(), v7), (heat.clone(), v8)],
    )?;
    let v9 = arena.add_outcome_node("v9_warming_unknowingly_prevented", ok.clone());
    let v10 = arena.add_outcome_node("v10_warming_unknowingly_allowed", too_warm);
    let v4 = arena.add_decision_node(
        "v4_unknown_warming",
        i.clone(),
        Some(unlearned_risk),
        vec![(dont_heat.clone(), v9), (heat.clone(), v10)],
    )?;
    let v1 = arena.add_decision_node(
        "v1_risk_of_warming",
        i.clone(),
        Some(unknown_risk),
        vec![(learn.clone(), v3), (dont_learn.clone(), v4)],
    )?;

    let v11 = arena.add_outcome_node("v11_cooling_unknowingly_allowed", too_cold.clone());
    let v12 = arena.add_outcome_node("v12_cooling_unknowingly_prevented", ok.clone());
    let v5 = arena.add_decision_node(
        "v5_unknown_cooling",
        i.clone(),
        Some(unlearned_risk),
        vec![(dont_heat.clone(), v11), (heat.clone(), v12)],
    )?;
    let v13 = arena.add_outcome_node("v13_cooling_knowingly_allowed", too_cold);
    let v14 = arena.add_outcome_node("v14_cooling_knowingly_prevented", ok);
    let v6 = arena.add_decision_node("v6_known_cooling", i.clone(), None, vec![(dont_heat, v13), (heat, v14)])?;
    let v2 = arena.add_decision_node(
        "v2_risk_of_cooling",
        i,
        Some(unknown_risk),
        vec![(dont_learn, v5), (learn, v6)],
    )?;

    let root = arena.add_probability_node("risk_type", vec![(v1, ratio(1, 3)), (v2, ratio(2, 3))])?;
    Tree::new("climate_learning", arena, root)
}

/// One decision of i: `a` is harmless, `b` is not.
pub fn single_decision() -> Result<Tree> {
    let mut arena = Arena::<Rational>::new();
    let [a, b] = actions(["a", "b"]);
    let good = arena.add_outcome_node("good", Outcome::acceptable("good"));
    let bad = arena.add_outcome_node("bad", Outcome::unacceptable("bad"));
    let v = arena.add_decision_node("v", Player::new("i"), None, vec![(a, good), (b, bad)])?;
    Tree::new("single_decision", arena, v)
}

/// One decision of i with `k` actions `a0..`, alternating harmless and harmful.
pub fn decision_with_actions(k: usize) -> Result<Tree> {
    let mut arena = Arena::<Rational>::new();
    let consequences: Vec<_> = (0..k)
        .map(|n| {
            let w = arena.add_outcome_node(format!("w{n}"), Outcome::new(format!("o{n}"), n % 2 == 0));
            (Action::new(format!("a{n}")), w)
        })
        .collect();
    let v = arena.add_decision_node("v", Player::new("i"), None, consequences)?;
    Tree::new(format!("decision_with_{k}_actions"), arena, v)
}

fn lottery<P: Probability>(arena: &mut Arena<P>, name: &str, harm: P) -> Result<NodeId> {
    let bad = arena.add_outcome_node(format!("{name}_bad"), Outcome::unacceptable("bad"));
    let good = arena.add_outcome_node(format!("{name}_good"), Outcome::acceptable("good"));
    let rest = (P::one() - harm.clone()).simplify();
    arena.add_probability_node(name, vec![(bad, harm), (good, rest)])
}

fn build_dominance<P: Probability>(low: P, high: P) -> Result<Tree<P>> {
    let mut arena = Arena::<P>::new();
    let [a, b, c, d] = actions(["a", "b", "c", "d"]);
    let [i, j] = players(["i", "j"]);
    let s = arena.add_information_set("S");

    let p1a = lottery(&mut arena, "p1a", low.clone())?;
    let p1b = lottery(&mut arena, "p1b", high.clone())?;
    let v1 = arena.add_decision_node("v1", i.clone(), Some(s), vec![(a.clone(), p1a), (b.clone(), p1b)])?;

    let p2c = lottery(&mut arena, "p2c", low.clone())?;
    let p2d = lottery(&mut arena, "p2d", low)?;
    let u = arena.add_decision_node("u", j, None, vec![(c, p2c), (d, p2d)])?;
    let p2b = lottery(&mut arena, "p2b", high)?;
    let v2 = arena.add_decision_node("v2", i, Some(s), vec![(a, u), (b, p2b)])?;

    let x = arena.add_possibility_node("x", vec![(v1, Some("left".into())), (v2, Some("right".into()))])?;
    Tree::new("dominance", arena, x)
}

pub fn dominance() -> Result<Tree> {
    build_dominance(ratio(1, 5), ratio(3, 5))
}

/// The dominance fixture over `f64` probabilities
pub fn dominance_f64() -> Result<Tree<f64>> {
    build_dominance(0.2, 0.6)
}

pub fn trusted_history() -> Result<Tree> {
    let mut arena = Arena::<Rational>::new();
    let i = Player::new("i");
    let [x, y, c, d] = actions(["x", "y", "c", "d"]);
    let good = Outcome::acceptable("good");
    let bad = Outcome::unacceptable("bad");
    let t = arena.add_information_set("T");
    let a = arena.add_information_set("A");

    let a1c = arena.add_outcome_node("a1c", bad.clone());
    let a1d = arena.add_outcome_node("a1d", bad.clone());
    let a1 = arena.add_decision_node("a1", i.clone(), Some(a), vec![(c.clone(), a1c), (d.clone(), a1d)])?;
    let b1 = arena.add_outcome_node("b1", good.clone());
    let t1 = arena.add_decision_node("t1", i.clone(), Some(t), vec![(x.clone(), a1), (y.clone(), b1)])?;

    let b2 = arena.add_outcome_node("b2", bad);
    let a2c = arena.add_outcome_node("a2c", good.clone());
    let a2d = arena.add_outcome_node("a2d", good);
    let a2 = arena.add_decision_node("a2", i.clone(), Some(a), vec![(c, a2c), (d, a2d)])?;
    let t2 = arena.add_decision_node("t2", i, Some(t), vec![(x, b2), (y, a2)])?;

    let r = arena.add_possibility_node("r", vec![(t1, None), (t2, None)])?;
    Tree::new("trusted_history", arena, r)
}

pub(crate) fn primes_below(bound: i128) -> Vec<i128> {
    (2..bound).filter(|&n| (2..n).take_while(|k| k * k <= n).all(|k| n % k != 0)).collect()
}

/// Chain of lotteries, one per prime `p` below `bound`: harm with `1/p`,
/// otherwise on to the next lottery. Exact likelihoods soon leave `i128`.
fn prime_chain(arena: &mut Arena<Rational>, prefix: &str, bound: i128) -> Result<NodeId> {
    let mut next = arena.add_outcome_node(format!("{prefix}_end"), Outcome::acceptable("good"));
    for p in primes_below(bound).into_iter().rev() {
        let bad = arena.add_outcome_node(format!("{prefix}_bad{p}"), Outcome::unacceptable("bad"));
        next = arena.add_probability_node(format!("{prefix}{p}"), vec![(bad, ratio(1, p)), (next, ratio(p - 1, p))])?;
    }
    Ok(next)
}

/// A [`prime_chain`] on its own
pub fn prime_lotteries(bound: i128) -> Result<Tree> {
    let mut arena = Arena::<Rational>::new();
    let root = prime_chain(&mut arena, "p", bound)?;
    Tree::new(format!("prime_lotteries_below_{bound}"), arena, root)
}

/// i picks `a` or `b` at `v`; after `a`, j decides at `j1`, which shares the
/// information set `J` with `u` on the other side of the root. Below `u`,
/// `p` leads into a prime chain.
pub fn remote_prime_chain(bound: i128) -> Result<Tree> {
    let mut arena = Arena::<Rational>::new();
    let [i, j] = players(["i", "j"]);
    let [a, b, p, q] = actions(["a", "b", "p", "q"]);
    let good = Outcome::acceptable("good");
    let bad = Outcome::unacceptable("bad");
    let shared = arena.add_information_set("J");

    let j1p = arena.add_outcome_node("j1p", bad.clone());
    let j1q = arena.add_outcome_node("j1q", good.clone());
    let j1 = arena.add_decision_node("j1", j.clone(), Some(shared), vec![(p.clone(), j1p), (q.clone(), j1q)])?;
    let vb = arena.add_outcome_node("vb", bad);
    let v = arena.add_decision_node("v", i, None, vec![(a, j1), (b, vb)])?;

    let chain = prime_chain(&mut arena, "u", bound)?;
    let uq = arena.add_outcome_node("uq", good);
    let u = arena.add_decision_node("u", j, Some(shared), vec![(p, chain), (q, uq)])?;

    let root = arena.add_possibility_node("root", vec![(v, None), (u, None)])?;
    Tree::new("remote_prime_chain", arena, root)
}
