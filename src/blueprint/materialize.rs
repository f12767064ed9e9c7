//! Turning an optimized plan into runtime iterators.

use tracing::warn;
use crate::blueprint::node::{NodeId, NodeKind, Operator};
use crate::blueprint::tree::PlanTree;
use crate::core::error::{Error, Result};
use crate::search::and::AndSearch;
use crate::search::andnot::AndNotSearch;
use crate::search::iterator::{BoxedIterator, FilterConstraint};
use crate::search::match_data::{MatchData, TermFieldMatchDataArray};
use crate::search::near::NearSearch;
use crate::search::or::OrSearch;
use crate::search::rank::RankSearch;
use crate::search::simple::EmptySearch;

impl PlanTree {
    /// Materialize the whole plan. Iterators borrow their match-data slots
    /// from `md`, so they cannot outlive it.
    pub fn create_search<'md>(&self, md: &'md MatchData) -> Result<BoxedIterator<'md>> {
        let root = self
            .root()
            .ok_or_else(|| Error::invalid_state("cannot create a search for a plan without a root"))?;
        Ok(self.create_search_at(root, md))
    }

    /// Materialize the subtree at `id` using the strictness recorded by the
    /// last `sort`.
    ///
    /// # Panics
    /// If a leaf source declines to produce an iterator.
    pub fn create_search_at<'md>(&self, id: NodeId, md: &'md MatchData) -> BoxedIterator<'md> {
        let node = self.node(id);
        let strict = node.strict;
        let op = match &node.kind {
            NodeKind::Leaf(leaf) => {
                let tfmda: TermFieldMatchDataArray<'md> =
                    leaf.fields.iter().map(|f| md.resolve(f.handle)).collect();
                return match leaf.source.create_leaf_search(tfmda, strict) {
                    Some(it) => it,
                    None => panic!("leaf source '{}' produced no iterator for {}", leaf.source.name(), id),
                };
            }
            NodeKind::Intermediate(op) => *op,
        };
        if node.children.is_empty() {
            return Box::new(EmptySearch::new());
        }
        let children: Vec<BoxedIterator<'md>> = node
            .children
            .iter()
            .map(|&c| self.create_search_at(c, md))
            .collect();
        match op {
            Operator::And => Box::new(AndSearch::new(children, strict)),
            Operator::Or => Box::new(OrSearch::new(children, strict)),
            Operator::WeakAnd { target_hits } => Box::new(OrSearch::weak_and(children, target_hits, strict)),
            Operator::AndNot => Box::new(AndNotSearch::new(children, strict)),
            Operator::Rank => Box::new(RankSearch::new(children, strict)),
            Operator::Near { window } | Operator::ONear { window } => {
                let Some(slots) = self.term_slots(id, md) else {
                    warn!(node = %id, "proximity child exposes no term field; plan matches nothing");
                    return Box::new(EmptySearch::new());
                };
                if matches!(op, Operator::ONear { .. }) {
                    Box::new(NearSearch::ordered(children, slots, window, strict))
                } else {
                    Box::new(NearSearch::new(children, slots, window, strict))
                }
            }
        }
    }

    /// Match-data free iterator approximating the plan from the side given
    /// by `constraint`.
    pub fn create_filter_search(&self, constraint: FilterConstraint) -> Result<BoxedIterator<'static>> {
        let root = self
            .root()
            .ok_or_else(|| Error::invalid_state("cannot create a filter for a plan without a root"))?;
        Ok(self.filter_search_at(root, constraint))
    }

    fn filter_search_at(&self, id: NodeId, constraint: FilterConstraint) -> BoxedIterator<'static> {
        let node = self.node(id);
        let strict = node.strict;
        let op = match &node.kind {
            NodeKind::Leaf(leaf) => return leaf.source.create_filter_search(strict, constraint),
            NodeKind::Intermediate(op) => *op,
        };
        if node.children.is_empty() {
            return Box::new(EmptySearch::new());
        }
        let filters = |c: &[NodeId], constraint: FilterConstraint| -> Vec<BoxedIterator<'static>> {
            c.iter().map(|&child| self.filter_search_at(child, constraint)).collect()
        };
        match op {
            Operator::And => Box::new(AndSearch::new(filters(&node.children, constraint), strict)),
            Operator::Or | Operator::WeakAnd { .. } => {
                Box::new(OrSearch::new(filters(&node.children, constraint), strict))
            }
            Operator::AndNot => {
                let mut children = filters(&node.children[..1], constraint);
                children.extend(filters(&node.children[1..], constraint.invert()));
                Box::new(AndNotSearch::new(children, strict))
            }
            Operator::Rank => self.filter_search_at(node.children[0], constraint),
            Operator::Near { .. } | Operator::ONear { .. } => match constraint {
                FilterConstraint::UpperBound => Box::new(AndSearch::new(filters(&node.children, constraint), strict)),
                FilterConstraint::LowerBound => Box::new(EmptySearch::new()),
            },
        }
    }

    /// One slot per child of a proximity node, taken from the first field
    /// each child exposes; `None` if some child exposes none.
    fn term_slots<'md>(&self, id: NodeId, md: &'md MatchData) -> Option<TermFieldMatchDataArray<'md>> {
        self.children(id)
            .iter()
            .map(|&c| self.state(c).fields.first().map(|f| md.resolve(f.handle)))
            .collect()
    }
}
