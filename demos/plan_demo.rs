/// Query planning walkthrough
///
/// Builds a small index, plans a few queries and shows:
/// - the optimized plan as text and JSON
/// - the materialized iterator tree
/// - hits with the term positions unpacked for them
/// - plan cache statistics

use std::sync::Arc;
use queryeval::index::term_index::TermIndex;
use queryeval::query::ast::{BoolQuery, Query};
use queryeval::search::executor::QueryExecutor;
use queryeval::search::iterator::{FilterConstraint, SearchIterator};
use queryeval::PlannerConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("\n╔═══════════════════════════════════════════════╗");
    println!("║   queryeval - Query Planning Demo             ║");
    println!("╚═══════════════════════════════════════════════╝\n");

    // Step 1: Index documents
    println!("Step 1: Indexing documents...");
    let mut builder = TermIndex::builder();
    builder
        .add_text(1, "title", "Rust query planner internals")
        .add_text(2, "title", "Planning queries with cost models")
        .add_text(3, "title", "A fast rust search engine")
        .add_text(4, "title", "Search engine query rewriting in rust")
        .add_attribute(1, "lang", "en")
        .add_attribute(3, "lang", "en")
        .add_attribute(4, "lang", "de");
    let index = Arc::new(builder.build());
    println!("  {} terms, docid limit {}\n", index.num_terms(), index.docid_limit());

    let executor = QueryExecutor::new(index, PlannerConfig::default());

    // Step 2: Plan a boolean query
    println!("Step 2: Planning a boolean query...");
    let query = Query::Bool(
        BoolQuery::new()
            .with_must(Query::term("title", "rust"))
            .with_should(Query::term("title", "engine"))
            .with_filter(Query::attribute("lang", "en"))
            .with_must_not(Query::term("title", "internals")),
    );
    let plan = executor.plan(&query)?;
    if let Some(root) = plan.tree.root() {
        println!("{}", plan.tree.as_string(root));
        println!("{}\n", serde_json::to_string_pretty(&plan.tree.as_json(root))?);
    }

    // Step 3: Materialize and run
    println!("Step 3: Executing...");
    let md = plan.layout.create_match_data();
    let it = plan.tree.create_search(&md)?;
    println!("  iterator: {}", it.as_string());
    let results = executor.execute(&query, 10)?;
    for hit in &results.hits {
        let terms: Vec<String> = hit
            .matched
            .iter()
            .map(|m| format!("{}:{}@{:?}", m.term.field, m.term.text, m.positions))
            .collect();
        println!("  doc {} [{}]", hit.doc_id, terms.join(", "));
    }
    println!("  {} hits in {}ms\n", results.total_hits, results.took_ms);

    // Step 4: Proximity and filters
    println!("Step 4: Proximity...");
    let near = Query::near("title", &["search", "engine"], 1);
    println!("  near(search engine, 1): {:?}", executor.execute(&near, 10)?.doc_ids());
    let onear = Query::onear("title", &["engine", "search"], 1);
    println!("  onear(engine search, 1): {:?}", executor.execute(&onear, 10)?.doc_ids());
    println!("  upper bound filter: {:?}", executor.filter(&near, FilterConstraint::UpperBound)?);
    println!("  lower bound filter: {:?}\n", executor.filter(&near, FilterConstraint::LowerBound)?);

    // Step 5: Cache
    executor.execute(&query, 10)?;
    let stats = executor.cache.stats();
    println!("Step 5: Plan cache");
    println!("  hits: {}, misses: {}, hit rate: {:.2}", stats.hit_count, stats.miss_count, stats.hit_rate());

    Ok(())
}
