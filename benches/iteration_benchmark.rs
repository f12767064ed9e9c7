use std::sync::Arc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use queryeval::core::types::BEGIN_ID;
use queryeval::index::term_index::TermIndex;
use queryeval::query::ast::{BoolQuery, Query};
use queryeval::search::executor::QueryExecutor;
use queryeval::PlannerConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const WORDS: [&str; 8] = ["the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog"];

/// Index of `docs` random sentences over a small vocabulary.
fn build_index(docs: u32) -> Arc<TermIndex> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut builder = TermIndex::builder();
    for doc_id in BEGIN_ID..BEGIN_ID + docs {
        let len = rng.gen_range(4..24);
        let text: Vec<&str> = (0..len).map(|_| WORDS[rng.gen_range(0..WORDS.len())]).collect();
        builder.add_text(doc_id, "body", &text.join(" "));
        builder.add_attribute(doc_id, "bucket", &format!("b{}", doc_id % 10));
    }
    Arc::new(builder.build())
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute");
    let queries = [
        ("term", Query::term("body", "fox")),
        ("and", Query::And(vec![Query::term("body", "quick"), Query::term("body", "lazy")])),
        ("or", Query::Or(vec![Query::term("body", "dog"), Query::term("body", "fox")])),
        ("near", Query::near("body", &["quick", "fox"], 3)),
        (
            "bool",
            Query::Bool(
                BoolQuery::new()
                    .with_must(Query::term("body", "brown"))
                    .with_filter(Query::attribute("bucket", "b3"))
                    .with_must_not(Query::term("body", "over")),
            ),
        ),
    ];

    for docs in [1_000u32, 20_000].iter() {
        let executor = QueryExecutor::new(build_index(*docs), PlannerConfig::default());
        for (label, query) in &queries {
            group.bench_with_input(BenchmarkId::new(*label, docs), query, |b, query| {
                b.iter(|| black_box(executor.execute(query, 10).unwrap().total_hits));
            });
        }
    }

    group.finish();
}

fn bench_plan_cache(c: &mut Criterion) {
    let query = Query::And(vec![Query::term("body", "quick"), Query::term("body", "lazy")]);
    let cached = QueryExecutor::new(build_index(1_000), PlannerConfig::default());
    let uncached = QueryExecutor::new(build_index(1_000), PlannerConfig::default());

    c.bench_function("plan_cached", |b| b.iter(|| black_box(cached.plan(&query).unwrap())));
    c.bench_function("plan_uncached", |b| {
        b.iter(|| {
            uncached.cache.clear();
            black_box(uncached.plan(&query).unwrap())
        })
    });
}

criterion_group!(benches, bench_queries, bench_plan_cache);
criterion_main!(benches);
