//! Tree rewrites: flattening of nested operators, child sorting and
//! strictness resolution.

use std::cmp::Ordering;
use tracing::{debug, trace};
use crate::blueprint::estimate::HitEstimate;
use crate::blueprint::flow::{self, FlowStats, InFlow};
use crate::blueprint::node::{NodeId, Operator};
use crate::blueprint::options::Options;
use crate::blueprint::tree::PlanTree;
use crate::core::error::{Error, Result};
use crate::core::types::UNSET_DOCID_LIMIT;

/// Consume a tree and return it optimized, with the root evaluated strict
/// when `strict` is set. `opts` is bound for the duration of the call.
pub fn optimize_and_sort(mut tree: PlanTree, strict: bool, opts: Option<Options>) -> Result<PlanTree> {
    tree.optimize_and_sort_with(strict, opts)?;
    Ok(tree)
}

impl PlanTree {
    /// Optimize with a strict root and the currently bound options.
    pub fn optimize_and_sort(&mut self) -> Result<()> {
        self.optimize_and_sort_with(true, None)
    }

    pub fn optimize_and_sort_with(&mut self, strict: bool, opts: Option<Options>) -> Result<()> {
        let root = self
            .root()
            .ok_or_else(|| Error::invalid_state("cannot optimize a plan without a root"))?;
        let _guard = opts.map(Options::bind);
        let nodes_before = self.node_count();
        let docid_limit = self.docid_limit(root);
        if docid_limit != UNSET_DOCID_LIMIT {
            self.set_docid_limit(root, docid_limit);
        }
        let collapsed = self.flatten(root);
        self.order_children(root);
        self.update_flow_stats(root, docid_limit);
        self.sort(root, strict);
        self.update_flow_stats(root, docid_limit);
        debug!(
            nodes_before,
            collapsed,
            nodes_after = self.node_count(),
            docid_limit,
            strict,
            "optimized plan"
        );
        Ok(())
    }

    /// Inject `docid_limit`, compute flow stats and resolve strictness
    /// without touching child order.
    pub fn null_plan(&mut self, strict: bool, docid_limit: u32) -> Result<()> {
        let root = self
            .root()
            .ok_or_else(|| Error::invalid_state("cannot plan a tree without a root"))?;
        let _guard = Options::bind(
            Options::current()
                .with_keep_order(true)
                .with_allow_force_strict(false),
        );
        self.set_docid_limit(root, docid_limit);
        self.update_flow_stats(root, docid_limit);
        self.sort(root, strict);
        Ok(())
    }

    /// Resolve strictness of `id` for `in_flow`, reorder its children and
    /// recurse with the in-flow each child then receives.
    pub fn sort(&mut self, id: NodeId, in_flow: impl Into<InFlow>) {
        let in_flow = in_flow.into();
        let opts = Options::current();
        let node = self.node(id);
        let forced = opts.allow_force_strict()
            && node.docid_limit != UNSET_DOCID_LIMIT
            && in_flow.prefers_strict(&node.flow);
        let strict = in_flow.is_strict() || forced;
        trace!(node = %id, strict, forced, rate = in_flow.rate(), "resolved strictness");
        self.node_mut(id).strict = strict;

        let Some(op) = self.operator(id) else {
            return;
        };
        if !opts.keep_order() && op.is_reorderable() {
            self.sort_children(id, op, strict, opts.sort_by_cost());
        }
        let own_flow = if strict { InFlow::strict() } else { InFlow::non_strict(in_flow.rate()) };
        let flows = self.child_flows(id, own_flow);
        let children = self.children(id).to_vec();
        for (child, child_flow) in children.into_iter().zip(flows) {
            self.sort(child, child_flow);
        }
    }

    /// Merge nested nodes of the same associative kind into their parent,
    /// bottom-up. Returns the number of nodes absorbed.
    pub(crate) fn flatten(&mut self, id: NodeId) -> usize {
        let mut absorbed_total = 0;
        for child in self.children(id).to_vec() {
            absorbed_total += self.flatten(child);
        }
        let Some(op) = self.operator(id) else {
            return absorbed_total;
        };
        let children = self.children(id).to_vec();
        let mut absorbed = Vec::new();
        let merged = match op {
            Operator::And | Operator::Or => {
                let mut merged = Vec::with_capacity(children.len());
                for child in children {
                    if self.operator(child) == Some(op) {
                        merged.extend_from_slice(self.children(child));
                        absorbed.push(child);
                    } else {
                        merged.push(child);
                    }
                }
                merged
            }
            Operator::AndNot if !children.is_empty() => {
                let mut positive = children[0];
                let mut nested_negatives = Vec::new();
                if self.operator(positive) == Some(Operator::AndNot) && self.child_count(positive) > 0 {
                    absorbed.push(positive);
                    let inner = self.children(positive);
                    nested_negatives.extend_from_slice(&inner[1..]);
                    positive = inner[0];
                }
                let mut merged = vec![positive];
                for &child in &children[1..] {
                    if self.operator(child) == Some(Operator::Or) {
                        merged.extend_from_slice(self.children(child));
                        absorbed.push(child);
                    } else {
                        merged.push(child);
                    }
                }
                merged.extend(nested_negatives);
                merged
            }
            _ => return absorbed_total,
        };
        if absorbed.is_empty() {
            return absorbed_total;
        }
        trace!(node = %id, absorbed = absorbed.len(), "flattened nested operators");
        for &gone in &absorbed {
            self.node_mut(gone).children.clear();
        }
        self.replace_children(id, merged);
        for &gone in &absorbed {
            self.free_node(gone);
        }
        absorbed_total + absorbed.len()
    }

    /// Put children in their tiered order bottom-up before flow stats are
    /// computed, so strictness is resolved against the final order. Cost
    /// ordering depends on strictness and is left to `sort`; the flow stats
    /// it reads are computed over cost order already.
    fn order_children(&mut self, id: NodeId) {
        for child in self.children(id).to_vec() {
            self.order_children(child);
        }
        let opts = Options::current();
        if opts.keep_order() || opts.sort_by_cost() {
            return;
        }
        if let Some(op) = self.operator(id).filter(Operator::is_reorderable) {
            self.sort_children(id, op, false, false);
        }
    }

    fn sort_children(&mut self, id: NodeId, op: Operator, strict: bool, by_cost: bool) {
        let children = self.children(id).to_vec();
        if children.len() < 2 {
            return;
        }
        let sorted: Vec<NodeId> = if by_cost {
            let stats: Vec<FlowStats> = children.iter().map(|&c| self.flow_stats(c)).collect();
            let order = match op {
                Operator::And | Operator::Near { .. } => flow::and_cost_order(&stats, strict),
                Operator::Or => flow::or_cost_order(&stats, strict),
                Operator::AndNot => {
                    let mut order = vec![0];
                    order.extend(flow::or_cost_order(&stats[1..], false).into_iter().map(|i| i + 1));
                    order
                }
                _ => return,
            };
            order.into_iter().map(|i| children[i]).collect()
        } else {
            let key = |c: NodeId| (self.state(c).cost_tier, self.state(c).estimate);
            let mut sorted = children.clone();
            match op {
                Operator::And | Operator::Near { .. } => sorted.sort_by(|&a, &b| tiered_less(key(a), key(b))),
                Operator::Or => sorted.sort_by(|&a, &b| tiered_greater(key(a), key(b))),
                Operator::AndNot => sorted[1..].sort_by(|&a, &b| tiered_greater(key(a), key(b))),
                _ => return,
            }
            sorted
        };
        if sorted != children {
            trace!(node = %id, by_cost, "reordered children");
            self.node_mut(id).children = sorted;
        }
    }
}

/// Lower cost tier first, then lower estimate.
fn tiered_less(a: (u8, HitEstimate), b: (u8, HitEstimate)) -> Ordering {
    a.0.cmp(&b.0).then(a.1.cmp(&b.1))
}

/// Lower cost tier first, then higher estimate.
fn tiered_greater(a: (u8, HitEstimate), b: (u8, HitEstimate)) -> Ordering {
    a.0.cmp(&b.0).then(b.1.cmp(&a.1))
}
