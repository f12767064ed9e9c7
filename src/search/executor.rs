use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use crate::core::config::PlannerConfig;
use crate::core::error::{Error, Result};
use crate::core::types::{DocId, Term, BEGIN_ID};
use crate::index::term_index::TermIndex;
use crate::query::ast::Query;
use crate::query::builder::{BuiltPlan, PlanBuilder};
use crate::query::cache::{PlanCache, PlanKey};
use crate::search::iterator::{drive, FilterConstraint};

/// Search results container
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub hits: Vec<Hit>,
    pub total_hits: usize,
    pub took_ms: u64,
}

impl SearchResults {
    pub fn doc_ids(&self) -> Vec<DocId> {
        self.hits.iter().map(|h| h.doc_id).collect()
    }
}

/// Matching document with the terms unpacked for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub doc_id: DocId,
    pub matched: Vec<TermMatch>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TermMatch {
    pub term: Term,
    pub positions: Vec<u32>,
}

/// Runs queries through build, docid-limit injection, optimization,
/// materialization and iteration. Optimized plans are cached.
pub struct QueryExecutor {
    pub index: Arc<TermIndex>,
    pub config: PlannerConfig,
    pub cache: PlanCache,
}

impl QueryExecutor {
    pub fn new(index: Arc<TermIndex>, config: PlannerConfig) -> Self {
        let cache = PlanCache::new(config.plan_cache_size);
        QueryExecutor { index, config, cache }
    }

    /// Optimized plan for `query`, from the cache when possible.
    pub fn plan(&self, query: &Query) -> Result<Arc<BuiltPlan>> {
        let key = PlanKey {
            query: query.clone(),
            docid_limit: self.index.docid_limit(),
            strict: self.config.topmost_strict,
            options: self.config.options(),
        };
        if let Some(plan) = self.cache.get(&key) {
            return Ok(plan);
        }

        let mut plan = PlanBuilder::new(&self.index).build(query)?;
        let root = plan
            .tree
            .root()
            .ok_or_else(|| Error::invalid_state("built plan has no root"))?;
        plan.tree.set_docid_limit(root, key.docid_limit);
        plan.tree.optimize_and_sort_with(key.strict, Some(key.options))?;
        if let Some(root) = plan.tree.root() {
            plan.tree.enumerate(root, 1);
        }

        let plan = Arc::new(plan);
        self.cache.put(key, plan.clone());
        Ok(plan)
    }

    /// Evaluate `query`, keeping the first `limit` hits in doc id order.
    pub fn execute(&self, query: &Query, limit: usize) -> Result<SearchResults> {
        let start = Instant::now();
        let plan = self.plan(query)?;
        let md = plan.layout.create_match_data();
        let mut it = plan.tree.create_search(&md)?;
        let end = self.index.docid_limit();

        let mut hits = Vec::new();
        let mut total_hits = 0;
        drive(it.as_mut(), BEGIN_ID, end, |it, doc| {
            it.unpack(doc);
            total_hits += 1;
            if hits.len() < limit {
                let matched = plan
                    .terms
                    .iter()
                    .filter_map(|(term, handle)| {
                        let slot = md.resolve(*handle).borrow();
                        slot.has_data(doc).then(|| TermMatch {
                            term: term.clone(),
                            positions: slot.positions.clone(),
                        })
                    })
                    .collect();
                hits.push(Hit { doc_id: doc, matched });
            }
        });

        debug!(total_hits, returned = hits.len(), docid_limit = end, "executed query");
        Ok(SearchResults {
            hits,
            total_hits,
            took_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Doc ids produced by the plan's filter approximation.
    pub fn filter(&self, query: &Query, constraint: FilterConstraint) -> Result<Vec<DocId>> {
        let plan = self.plan(query)?;
        let mut it = plan.tree.create_filter_search(constraint)?;
        let mut docs = Vec::new();
        drive(it.as_mut(), BEGIN_ID, self.index.docid_limit(), |_, doc| docs.push(doc));
        Ok(docs)
    }
}
