//! Criterion benchmarks for likelihood evaluation, with and without memoization

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use culpa_engine::test_tree::{climate_learning, forward_trust};
use culpa_engine::{EngineConfig, Group, Player, Resolve};

fn benchmark_guaranteed_likelihood(c: &mut Criterion) {
    let i = Group::singleton(&Player::new("i"));
    for memoize in [true, false] {
        let name = if memoize { "gamma_memoized" } else { "gamma_uncached" };
        c.bench_function(name, |b| {
            b.iter_batched(
                || {
                    forward_trust()
                        .expect("fixture builds")
                        .with_config(EngineConfig::default().with_memoize(memoize))
                },
                |tree| {
                    let branch = tree.root_branch();
                    black_box(branch.get_guaranteed_likelihood(tree.root(), &i).expect("valid query"))
                },
                BatchSize::SmallInput,
            )
        });
    }
}

fn benchmark_worst_case_likelihood(c: &mut Criterion) {
    let tree = climate_learning().expect("fixture builds");
    c.bench_function("worst_case_climate_warm_cache", |b| {
        b.iter(|| {
            tree.root_branch()
                .get_likelihood(black_box(tree.root()), None, None, Resolve::Max)
                .expect("valid query")
        })
    });
}

criterion_group!(benches, benchmark_guaranteed_likelihood, benchmark_worst_case_likelihood);
criterion_main!(benches);
