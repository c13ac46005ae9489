//! Criterion benchmarks for scenario and strategy enumeration

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use culpa_engine::enumerate::Selection;
use culpa_engine::test_tree::{decision_with_actions, forward_trust};
use culpa_engine::{Group, NodeKind, Player};

fn benchmark_forward_trust_enumeration(c: &mut Criterion) {
    let tree = forward_trust().expect("fixture builds");
    let branch = tree.root_branch();
    let root = tree.root();
    let i = Group::singleton(&Player::new("i"));
    let j = Group::singleton(&Player::new("j"));

    c.bench_function("strategies_forward_trust", |b| {
        b.iter(|| branch.get_strategies(black_box(root), &j).expect("valid query").count())
    });
    c.bench_function("scenarios_forward_trust", |b| {
        b.iter(|| branch.get_scenarios(black_box(root), &i).expect("valid query").count())
    });
    let selection = Selection::excluding([NodeKind::Probability]).expect("inner kinds only");
    c.bench_function("partial_solutions_forward_trust", |b| {
        b.iter(|| {
            branch
                .get_partial_solutions(black_box(root), &selection)
                .expect("valid query")
                .count()
        })
    });
}

fn benchmark_wide_decision(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategies_wide_decision");
    let i = Group::singleton(&Player::new("i"));
    for k in [2usize, 16, 128] {
        let tree = decision_with_actions(k).expect("fixture builds");
        group.bench_with_input(BenchmarkId::from_parameter(k), &tree, |b, tree| {
            b.iter(|| {
                tree.root_branch()
                    .get_strategies(tree.root(), &i)
                    .expect("valid query")
                    .count()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_forward_trust_enumeration, benchmark_wide_decision);
criterion_main!(benches);
