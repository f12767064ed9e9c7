//! Leaf collaborators: what a plan leaf knows about the index structure it
//! will search.

use std::fmt;
use std::sync::Arc;
use roaring::RoaringBitmap;
use crate::blueprint::estimate::HitEstimate;
use crate::blueprint::flow::FlowStats;
use crate::blueprint::state::COST_TIER_NORMAL;
use crate::core::types::DocId;
use crate::index::posting::PostingList;
use crate::index::skiplist::SkipList;
use crate::search::iterator::{BoxedIterator, FilterConstraint};
use crate::search::leaf::{BitVectorIterator, PostingIterator};
use crate::search::match_data::TermFieldMatchDataArray;
use crate::search::simple::{EmptySearch, FullSearch};

/// Supplies estimates and iterators for one plan leaf.
pub trait LeafSource: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn estimate(&self) -> HitEstimate;

    fn cost_tier(&self) -> u8 {
        COST_TIER_NORMAL
    }

    fn calculate_flow_stats(&self, estimate: HitEstimate, docid_limit: u32) -> FlowStats {
        FlowStats::leaf_default(estimate.relative(docid_limit), docid_limit)
    }

    /// Iterator filling the given match-data slots on unpack. `None` means
    /// the source cannot search, which the caller treats as a broken plan.
    fn create_leaf_search<'md>(
        &self,
        tfmda: TermFieldMatchDataArray<'md>,
        strict: bool,
    ) -> Option<BoxedIterator<'md>>;

    /// Match-data free approximation of this leaf.
    fn create_filter_search(&self, strict: bool, constraint: FilterConstraint) -> BoxedIterator<'static> {
        match constraint {
            FilterConstraint::UpperBound => Box::new(FullSearch::new(strict)),
            FilterConstraint::LowerBound => Box::new(EmptySearch::new()),
        }
    }
}

/// Term occurrences backed by a posting list.
#[derive(Debug, Clone)]
pub struct PostingSource {
    name: String,
    postings: Arc<PostingList>,
    skips: Arc<SkipList>,
}

impl PostingSource {
    pub fn new(name: impl Into<String>, postings: Arc<PostingList>) -> Self {
        let skips = Arc::new(SkipList::build(&postings));
        PostingSource {
            name: name.into(),
            postings,
            skips,
        }
    }

    pub fn postings(&self) -> &PostingList {
        &self.postings
    }
}

impl LeafSource for PostingSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn estimate(&self) -> HitEstimate {
        HitEstimate::new(self.postings.doc_freq(), self.postings.is_empty())
    }

    fn create_leaf_search<'md>(
        &self,
        tfmda: TermFieldMatchDataArray<'md>,
        strict: bool,
    ) -> Option<BoxedIterator<'md>> {
        let tfmd = tfmda.first().copied();
        Some(Box::new(PostingIterator::new(
            self.postings.clone(),
            self.skips.clone(),
            tfmd,
            strict,
        )))
    }

    fn create_filter_search(&self, strict: bool, _constraint: FilterConstraint) -> BoxedIterator<'static> {
        Box::new(PostingIterator::new(self.postings.clone(), self.skips.clone(), None, strict))
    }
}

/// Attribute-style membership backed by a bitmap. Matching is exact but
/// slower to drive than a posting list.
#[derive(Debug, Clone)]
pub struct BitVectorSource {
    name: String,
    bits: Arc<RoaringBitmap>,
    cost_tier: u8,
}

impl BitVectorSource {
    pub fn new(name: impl Into<String>, bits: Arc<RoaringBitmap>) -> Self {
        BitVectorSource {
            name: name.into(),
            bits,
            cost_tier: COST_TIER_NORMAL,
        }
    }

    pub fn from_docs<I: IntoIterator<Item = DocId>>(name: impl Into<String>, docs: I) -> Self {
        BitVectorSource::new(name, Arc::new(docs.into_iter().collect()))
    }

    pub fn with_cost_tier(mut self, tier: u8) -> Self {
        self.cost_tier = tier;
        self
    }
}

impl LeafSource for BitVectorSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn estimate(&self) -> HitEstimate {
        let hits = u32::try_from(self.bits.len()).unwrap_or(u32::MAX);
        HitEstimate::new(hits, self.bits.is_empty())
    }

    fn cost_tier(&self) -> u8 {
        self.cost_tier
    }

    fn create_leaf_search<'md>(
        &self,
        tfmda: TermFieldMatchDataArray<'md>,
        strict: bool,
    ) -> Option<BoxedIterator<'md>> {
        Some(Box::new(BitVectorIterator::new(self.bits.clone(), tfmda.first().copied(), strict)))
    }

    fn create_filter_search(&self, strict: bool, _constraint: FilterConstraint) -> BoxedIterator<'static> {
        Box::new(BitVectorIterator::new(self.bits.clone(), None, strict))
    }
}

/// Leaf with a fixed estimate over an explicit document set. The estimate
/// is taken as given, which makes it handy for planning experiments.
#[derive(Debug, Clone)]
pub struct FakeSource {
    name: String,
    estimate: HitEstimate,
    docs: Arc<RoaringBitmap>,
}

impl FakeSource {
    pub fn new(name: impl Into<String>, estimate: HitEstimate) -> Self {
        FakeSource {
            name: name.into(),
            estimate,
            docs: Arc::new(RoaringBitmap::new()),
        }
    }

    pub fn with_docs<I: IntoIterator<Item = DocId>>(mut self, docs: I) -> Self {
        self.docs = Arc::new(docs.into_iter().collect());
        self
    }

    /// Non-empty source estimating `est_hits` and matching nothing.
    pub fn hits(est_hits: u32) -> Arc<dyn LeafSource> {
        Arc::new(FakeSource::new(format!("fake:{}", est_hits), HitEstimate::hits(est_hits)))
    }
}

impl LeafSource for FakeSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn estimate(&self) -> HitEstimate {
        self.estimate
    }

    fn create_leaf_search<'md>(
        &self,
        tfmda: TermFieldMatchDataArray<'md>,
        strict: bool,
    ) -> Option<BoxedIterator<'md>> {
        Some(Box::new(BitVectorIterator::new(self.docs.clone(), tfmda.first().copied(), strict)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::state::COST_TIER_EXPENSIVE;
    use crate::index::posting::Posting;
    use crate::search::iterator::collect_hits;

    #[test]
    fn test_posting_source_estimate() {
        let mut list = PostingList::new();
        list.add_posting(Posting::new(3, vec![0]));
        list.add_posting(Posting::new(8, vec![1]));
        let source = PostingSource::new("title:rust", Arc::new(list));
        assert_eq!(source.estimate(), HitEstimate::new(2, false));
        assert_eq!(source.name(), "title:rust");

        let empty = PostingSource::new("title:none", Arc::new(PostingList::new()));
        assert!(empty.estimate().empty);
    }

    #[test]
    fn test_bitvector_cost_tier() {
        let source = BitVectorSource::from_docs("lang:en", [2, 3, 9]);
        assert_eq!(source.cost_tier(), COST_TIER_NORMAL);
        let source = source.with_cost_tier(COST_TIER_EXPENSIVE);
        assert_eq!(source.cost_tier(), COST_TIER_EXPENSIVE);
        assert_eq!(source.estimate(), HitEstimate::hits(3));
    }

    #[test]
    fn test_bitvector_filter_is_exact() {
        let source = BitVectorSource::from_docs("lang:en", [2, 3, 9]);
        for constraint in [FilterConstraint::UpperBound, FilterConstraint::LowerBound] {
            let mut it = source.create_filter_search(true, constraint);
            assert_eq!(collect_hits(it.as_mut(), 1, 20), vec![2, 3, 9]);
        }
    }

    #[test]
    fn test_default_filter_bounds() {
        let source = FakeSource::new("fake", HitEstimate::hits(10));
        let mut upper = source.create_filter_search(true, FilterConstraint::UpperBound);
        assert_eq!(collect_hits(upper.as_mut(), 1, 4), vec![1, 2, 3]);
        let mut lower = source.create_filter_search(true, FilterConstraint::LowerBound);
        assert!(collect_hits(lower.as_mut(), 1, 4).is_empty());
    }
}
