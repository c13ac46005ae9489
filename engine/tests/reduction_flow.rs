use culpa_engine::dominance::{is_strictly_dominated, is_weakly_dominated, trust_based_reduced_tree};
use culpa_engine::test_tree::{climate_learning, forward_trust};
use culpa_engine::{ratio, Action, Group, Player};

#[test]
fn test_trust_removes_risk_after_defection() {
    let tree = forward_trust().unwrap();
    let branch = tree.root_branch();
    let i = Group::singleton(&Player::new("i"));
    let v1d = branch.node_by_name("v1D").unwrap();
    assert_eq!(branch.get_guaranteed_likelihood(v1d, &i).unwrap(), ratio(1, 1));

    let ins_v1 = branch.information_set_by_name("ins_v1").unwrap();
    let (reduced, subs) = trust_based_reduced_tree(&tree, ins_v1).unwrap();
    assert_eq!(reduced.name(), "forward_trust_reduced_for_ins_v1");
    let reduced_v1d = subs.node(v1d).unwrap();
    assert_eq!(
        reduced.root_branch().get_guaranteed_likelihood(reduced_v1d, &i).unwrap(),
        ratio(0, 1)
    );
    // source tree is left alone
    assert_eq!(tree.root_branch().outcome_nodes().len(), 8);
    assert_eq!(reduced.root_branch().outcome_nodes().len(), 3);
}

#[test]
fn test_reduced_climate_problem() {
    let tree = climate_learning().unwrap();
    let i = Group::singleton(&Player::new("i"));
    let unknown = tree.root_branch().information_set_by_name("unknown_risk").unwrap();
    assert_eq!(tree.root_branch().get_strategies(tree.root(), &i).unwrap().count(), 6);

    let (reduced, subs) = trust_based_reduced_tree(&tree, unknown).unwrap();
    assert_eq!(reduced.name(), "climate_learning_reduced_for_unknown_risk");
    let branch = reduced.root_branch();
    assert_eq!(branch.get_strategies(reduced.root(), &i).unwrap().count(), 3);
    assert_eq!(branch.get_guaranteed_likelihood(reduced.root(), &i).unwrap(), ratio(0, 1));

    let anchor = subs.infoset(unknown).unwrap();
    let dont_learn = Action::new("dont_learn");
    assert!(is_weakly_dominated(&reduced, &dont_learn, anchor).unwrap());
    assert!(!is_strictly_dominated(&reduced, &dont_learn, anchor).unwrap());
}

#[test]
fn test_reduction_keeps_memo_of_source_valid() {
    let tree = climate_learning().unwrap();
    let i = Group::singleton(&Player::new("i"));
    let before = tree.root_branch().get_guaranteed_likelihood(tree.root(), &i).unwrap();
    let unknown = tree.root_branch().information_set_by_name("unknown_risk").unwrap();
    let _ = trust_based_reduced_tree(&tree, unknown).unwrap();
    let after = tree.root_branch().get_guaranteed_likelihood(tree.root(), &i).unwrap();
    assert_eq!(before, after);
}
