use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use queryeval::blueprint::node::{LeafSpec, NodeId, Operator};
use queryeval::blueprint::tree::PlanTree;
use queryeval::index::source::FakeSource;
use queryeval::Options;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random And/Or tree with `leaves` leaves and nested operators of the
/// same kind, so flattening has work to do.
fn random_tree(rng: &mut StdRng, leaves: usize) -> PlanTree {
    let mut tree = PlanTree::new();
    let mut pending: Vec<NodeId> = (0..leaves)
        .map(|i| {
            let hits = rng.gen_range(1..100_000);
            tree.add_leaf(LeafSpec::new(FakeSource::hits(hits)).field(0, i as u32))
        })
        .collect();
    while pending.len() > 1 {
        let take = rng.gen_range(2..=4).min(pending.len());
        let children: Vec<NodeId> = pending.drain(..take).collect();
        let op = if rng.gen_bool(0.5) { Operator::And } else { Operator::Or };
        let parent = tree.intermediate(op, children).unwrap();
        pending.push(parent);
    }
    tree.set_root(pending[0]).unwrap();
    tree
}

fn bench_optimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimize_and_sort");

    for leaves in [8, 64, 512].iter() {
        for (label, sort_by_cost) in [("tier", false), ("cost", true)] {
            group.bench_with_input(BenchmarkId::new(label, leaves), leaves, |b, &leaves| {
                b.iter_batched(
                    || {
                        let mut tree = random_tree(&mut StdRng::seed_from_u64(leaves as u64), leaves);
                        let root = tree.root().unwrap();
                        tree.set_docid_limit(root, 1_000_000);
                        tree
                    },
                    |mut tree| {
                        let opts = Options::new(sort_by_cost, false, false);
                        tree.optimize_and_sort_with(true, Some(opts)).unwrap();
                        black_box(tree.node_count())
                    },
                    criterion::BatchSize::SmallInput,
                );
            });
        }
    }

    group.finish();
}

fn bench_dump(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let mut tree = random_tree(&mut rng, 128);
    let root = tree.root().unwrap();
    tree.set_docid_limit(root, 1_000_000);
    tree.optimize_and_sort().unwrap();

    c.bench_function("dump_json_128", |b| b.iter(|| black_box(tree.as_json(root))));
    c.bench_function("dump_text_128", |b| b.iter(|| black_box(tree.as_string(root))));
}

criterion_group!(benches, bench_optimize, bench_dump);
criterion_main!(benches);
