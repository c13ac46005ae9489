use culpa_engine::test_tree;
use culpa_engine::{ratio, Group, InfosetId, Outcome, Rational, Resolve};
use culpa_tree::{BuildError, TreeBuilder};

fn coordination() -> (culpa_engine::Tree, culpa_tree::Registry) {
    let mut builder = TreeBuilder::<Rational>::new();
    let [i, j] = builder.players(["i", "j"]);
    let [cinema, theater] = builder.actions(["cinema", "theater"]);
    let meet = builder.outcome("meet", true).unwrap();
    let miss = builder.outcome("dont_meet", false).unwrap();
    let w1 = builder.outcome_node("w1", &meet).unwrap();
    let w2 = builder.outcome_node("w2", &miss).unwrap();
    let w3 = builder.outcome_node("w3", &miss).unwrap();
    let w4 = builder.outcome_node("w4", &meet).unwrap();
    let v1 = builder
        .simultaneous_move(
            "v1",
            &[i, j],
            &[],
            vec![
                (vec![cinema.clone(), cinema.clone()], w1),
                (vec![cinema.clone(), theater.clone()], w2),
                (vec![theater.clone(), cinema], w3),
                (vec![theater.clone(), theater], w4),
            ],
        )
        .unwrap();
    builder.build("coordination", v1).unwrap()
}

#[test]
fn test_simultaneous_move_shares_information_set() {
    let (tree, registry) = coordination();
    let ins = registry.information_set("S_v1_j").unwrap();
    let members = tree.arena().infoset(ins).unwrap().nodes().to_vec();
    assert_eq!(
        members,
        vec![
            registry.node("v1_cinema").unwrap(),
            registry.node("v1_theater").unwrap()
        ]
    );
    assert!(registry.information_set("S_v1_i").is_some());
    let rendered = tree.to_string();
    assert!(rendered.contains("cinema╶─╴v1_cinema (S_v1_j): j"));
    assert!(rendered.contains("theater╶─╴w4: meet ✔"));
}

#[test]
fn test_coordination_likelihoods() {
    let (tree, registry) = coordination();
    let branch = tree.root_branch();
    let i = registry.player("i").unwrap().clone();
    let j = registry.player("j").unwrap().clone();
    let root = tree.root();

    assert_eq!(branch.get_strategies(root, &Group::singleton(&j)).unwrap().count(), 2);
    assert_eq!(branch.get_guaranteed_likelihood(root, &Group::singleton(&i)).unwrap(), ratio(1, 1));
    let both = Group::new("ij", [i, j]);
    assert_eq!(branch.get_guaranteed_likelihood(root, &both).unwrap(), ratio(0, 1));
    assert_eq!(branch.get_likelihood(root, None, None, Resolve::Min).unwrap(), ratio(0, 1));
}

#[test]
fn test_incomplete_action_product_rejected() {
    let mut builder = TreeBuilder::<Rational>::new();
    let [i, j] = builder.players(["i", "j"]);
    let [a, b] = builder.actions(["a", "b"]);
    let ok = builder.outcome("ok", true).unwrap();
    let w1 = builder.outcome_node("w1", &ok).unwrap();
    let w2 = builder.outcome_node("w2", &ok).unwrap();
    let w3 = builder.outcome_node("w3", &ok).unwrap();
    let err = builder
        .simultaneous_move(
            "v",
            &[i, j],
            &[],
            vec![
                (vec![a.clone(), a.clone()], w1),
                (vec![a.clone(), b.clone()], w2),
                (vec![b, a], w3),
            ],
        )
        .unwrap_err();
    assert!(matches!(err, BuildError::MalformedSimultaneousMove { .. }));
    assert!(builder.registry().node("v").is_none());
}

#[test]
fn test_tuple_length_must_match_players() {
    let mut builder = TreeBuilder::<Rational>::new();
    let [i, j] = builder.players(["i", "j"]);
    let a = builder.action("a");
    let ok = builder.outcome("ok", true).unwrap();
    let w = builder.outcome_node("w", &ok).unwrap();
    let err = builder.simultaneous_move("v", &[i, j], &[], vec![(vec![a], w)]).unwrap_err();
    assert!(matches!(err, BuildError::MalformedSimultaneousMove { .. }));
}

#[test]
fn test_duplicate_node_name_rejected() {
    let mut builder = TreeBuilder::<Rational>::new();
    let ok = builder.outcome("ok", true).unwrap();
    builder.outcome_node("w", &ok).unwrap();
    let err = builder.outcome_node("w", &ok).unwrap_err();
    assert!(matches!(err, BuildError::DuplicateName { kind: "node", .. }));
    // unnamed nodes never clash
    builder.outcome_node("", &ok).unwrap();
    builder.outcome_node("", &ok).unwrap();
}

#[test]
fn test_engine_errors_pass_through() {
    let mut builder = TreeBuilder::<Rational>::new();
    let ok = builder.outcome("ok", true).unwrap();
    let w1 = builder.outcome_node("w1", &ok).unwrap();
    let w2 = builder.outcome_node("w2", &ok).unwrap();
    let err = builder
        .probability("p", vec![(w1, ratio(1, 2)), (w2, ratio(1, 3))])
        .unwrap_err();
    assert!(matches!(err, BuildError::Engine(culpa_engine::Error::Structure(_))));
}

#[test]
fn test_builder_reproduces_forward_trust_fixture() {
    let mut builder = TreeBuilder::<Rational>::new();
    let [i, j] = builder.players(["i", "j"]);
    let [c, d] = builder.actions(["C", "D"]);
    let good = builder.outcome("good", true).unwrap();
    let bad = builder.outcome("bad", false).unwrap();

    let pair = |builder: &mut TreeBuilder, node: &str, ins: Option<InfosetId>, last: &Outcome| {
        let wc = builder.outcome_node(&format!("w{}C", &node[1..]), &good).unwrap();
        let wd = builder.outcome_node(&format!("w{}D", &node[1..]), last).unwrap();
        builder
            .decision(node, &j, ins, vec![(c.clone(), wc), (d.clone(), wd)])
            .unwrap()
    };
    let v1c = pair(&mut builder, "v1C", None, &good);
    let v1d = pair(&mut builder, "v1D", None, &bad);
    let s2i = builder.information_set("S2i");
    let v2c = pair(&mut builder, "v2C", Some(s2i), &good);
    let v2d = pair(&mut builder, "v2D", Some(s2i), &bad);

    let v1 = builder
        .decision("v1", &i, None, vec![(c.clone(), v1c), (d.clone(), v1d)])
        .unwrap();
    let v2 = builder.decision("v2", &i, None, vec![(c, v2c), (d, v2d)]).unwrap();
    let v0 = builder.possibility("v0", vec![(v1, None), (v2, None)]).unwrap();
    let (tree, registry) = builder.build("forward_trust", v0).unwrap();

    assert_eq!(tree.to_string(), test_tree::forward_trust().unwrap().to_string());
    assert!(registry.information_set("ins_v1D").is_some());
}
