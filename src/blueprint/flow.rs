//! Cost model for plan nodes.
//!
//! Every node summarizes itself as [`FlowStats`]: the fraction of documents
//! it matches and what it costs to evaluate, per candidate document offered
//! to it (non-strict) or when it must find its own next match (strict).
//! Combining children assumes their matches are independent: a child only
//! sees the documents that survived the children evaluated before it.

use std::cmp::Ordering;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FlowStats {
    pub estimate: f64,
    pub cost: f64,
    pub strict_cost: f64,
}

impl FlowStats {
    pub fn new(estimate: f64, cost: f64, strict_cost: f64) -> Self {
        FlowStats { estimate, cost, strict_cost }
    }

    /// Stats for a simple scan-or-seek leaf: unit cost per offered candidate
    /// and a strict cost proportional to the expected seek distance.
    pub fn leaf_default(relative_estimate: f64, docid_limit: u32) -> Self {
        if docid_limit == 0 {
            return FlowStats::default();
        }
        let est = relative_estimate.clamp(0.0, 1.0);
        FlowStats { estimate: est, cost: 1.0, strict_cost: est }
    }
}

/// How documents flow into a node: either the node drives iteration itself
/// (strict) or it is offered a fraction `rate` of all documents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InFlow {
    strict: bool,
    rate: f64,
}

impl InFlow {
    pub fn strict() -> Self {
        InFlow { strict: true, rate: 1.0 }
    }

    pub fn non_strict(rate: f64) -> Self {
        InFlow { strict: false, rate: rate.clamp(0.0, 1.0) }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Whether iterating strict is at least as cheap as being offered
    /// `rate` of the documents.
    pub fn prefers_strict(&self, stats: &FlowStats) -> bool {
        self.strict || stats.strict_cost <= self.rate * stats.cost
    }
}

impl From<bool> for InFlow {
    fn from(strict: bool) -> Self {
        if strict { InFlow::strict() } else { InFlow::non_strict(1.0) }
    }
}

impl From<f64> for InFlow {
    fn from(rate: f64) -> Self {
        InFlow::non_strict(rate)
    }
}

/// Conjunction. Each child is offered what survived the children before it;
/// when strict, the first child drives and pays its strict cost.
pub fn and_cost(children: &[FlowStats], strict: bool) -> f64 {
    let mut cost = 0.0;
    let mut rate = 1.0;
    for (i, child) in children.iter().enumerate() {
        cost += if strict && i == 0 { child.strict_cost } else { rate * child.cost };
        rate *= child.estimate;
    }
    cost
}

/// Disjunction. Non-strict evaluation stops at the first matching child;
/// strict evaluation needs every child to find its own next match.
pub fn or_cost(children: &[FlowStats], strict: bool) -> f64 {
    if strict {
        return children.iter().map(|c| c.strict_cost).sum();
    }
    let mut cost = 0.0;
    let mut rate = 1.0;
    for child in children {
        cost += rate * child.cost;
        rate *= 1.0 - child.estimate;
    }
    cost
}

/// The first child is positive, the rest are subtracted and only evaluated
/// for documents not yet excluded.
pub fn and_not_cost(children: &[FlowStats], strict: bool) -> f64 {
    let Some((first, rest)) = children.split_first() else {
        return 0.0;
    };
    let mut cost = if strict { first.strict_cost } else { first.cost };
    let mut rate = first.estimate;
    for child in rest {
        cost += rate * child.cost;
        rate *= 1.0 - child.estimate;
    }
    cost
}

/// The first child decides matching; the others are only unpacked for
/// documents the first child matched.
pub fn rank_cost(children: &[FlowStats], strict: bool) -> f64 {
    let Some((first, rest)) = children.split_first() else {
        return 0.0;
    };
    let base = if strict { first.strict_cost } else { first.cost };
    base + rest.iter().map(|c| first.estimate * c.cost).sum::<f64>()
}

/// In-flow offered to each child of a conjunction, in child order.
pub fn and_child_flows(children: &[FlowStats], in_flow: InFlow) -> Vec<InFlow> {
    let mut flows = Vec::with_capacity(children.len());
    let mut rate = in_flow.rate();
    for (i, child) in children.iter().enumerate() {
        if i == 0 && in_flow.is_strict() {
            flows.push(InFlow::strict());
        } else {
            flows.push(InFlow::non_strict(rate));
        }
        rate *= child.estimate;
    }
    flows
}

/// In-flow offered to each child of a disjunction.
pub fn or_child_flows(children: &[FlowStats], in_flow: InFlow) -> Vec<InFlow> {
    if in_flow.is_strict() {
        return vec![InFlow::strict(); children.len()];
    }
    let mut flows = Vec::with_capacity(children.len());
    let mut rate = in_flow.rate();
    for child in children {
        flows.push(InFlow::non_strict(rate));
        rate *= 1.0 - child.estimate;
    }
    flows
}

pub fn and_not_child_flows(children: &[FlowStats], in_flow: InFlow) -> Vec<InFlow> {
    let Some((first, rest)) = children.split_first() else {
        return Vec::new();
    };
    let mut flows = Vec::with_capacity(children.len());
    flows.push(if in_flow.is_strict() { InFlow::strict() } else { InFlow::non_strict(in_flow.rate()) });
    let mut rate = in_flow.rate() * first.estimate;
    for child in rest {
        flows.push(InFlow::non_strict(rate));
        rate *= 1.0 - child.estimate;
    }
    flows
}

pub fn rank_child_flows(children: &[FlowStats], in_flow: InFlow) -> Vec<InFlow> {
    let Some((first, rest)) = children.split_first() else {
        return Vec::new();
    };
    let mut flows = Vec::with_capacity(children.len());
    flows.push(if in_flow.is_strict() { InFlow::strict() } else { InFlow::non_strict(in_flow.rate()) });
    let rate = in_flow.rate() * first.estimate;
    flows.extend(rest.iter().map(|_| InFlow::non_strict(rate)));
    flows
}

/// Non-strict conjunction order: cheap children that remove many documents
/// go first (ascending `cost / (1 - estimate)`).
pub fn cmp_and_cost(a: &FlowStats, b: &FlowStats) -> Ordering {
    let rank = |s: &FlowStats| {
        let pass = 1.0 - s.estimate;
        if pass <= 0.0 { f64::INFINITY } else { s.cost / pass }
    };
    rank(a).total_cmp(&rank(b))
}

/// Non-strict disjunction order: cheap children that match many documents
/// go first (ascending `cost / estimate`).
pub fn cmp_or_cost(a: &FlowStats, b: &FlowStats) -> Ordering {
    let rank = |s: &FlowStats| {
        if s.estimate <= 0.0 { f64::INFINITY } else { s.cost / s.estimate }
    };
    rank(a).total_cmp(&rank(b))
}

/// Order that minimizes `and_cost` for independent children.
///
/// Children are ranked by [`cmp_and_cost`]; when strict, every child is tried
/// as the driving first child and the cheapest arrangement wins.
pub fn and_cost_order(children: &[FlowStats], strict: bool) -> Vec<usize> {
    let mut order: Vec<usize> = (0..children.len()).collect();
    order.sort_by(|&a, &b| cmp_and_cost(&children[a], &children[b]));
    if !strict || order.len() < 2 {
        return order;
    }
    let mut best = order.clone();
    let mut best_cost = ordered_and_cost(children, &best, true);
    for pos in 1..order.len() {
        let mut candidate = order.clone();
        let first = candidate.remove(pos);
        candidate.insert(0, first);
        let cost = ordered_and_cost(children, &candidate, true);
        if cost < best_cost {
            best_cost = cost;
            best = candidate;
        }
    }
    best
}

fn ordered_and_cost(children: &[FlowStats], order: &[usize], strict: bool) -> f64 {
    let ordered: Vec<FlowStats> = order.iter().map(|&i| children[i]).collect();
    and_cost(&ordered, strict)
}

/// Order that minimizes non-strict `or_cost`; strict disjunctions have no
/// preferred order and keep the highest estimate first.
pub fn or_cost_order(children: &[FlowStats], strict: bool) -> Vec<usize> {
    let mut order: Vec<usize> = (0..children.len()).collect();
    if strict {
        order.sort_by(|&a, &b| children[b].estimate.total_cmp(&children[a].estimate));
    } else {
        order.sort_by(|&a, &b| cmp_or_cost(&children[a], &children[b]));
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(est: f64) -> FlowStats {
        FlowStats::leaf_default(est, 1000)
    }

    #[test]
    fn leaf_stats() {
        let stats = leaf(0.25);
        assert_eq!(stats.cost, 1.0);
        assert_eq!(stats.strict_cost, 0.25);
        assert_eq!(FlowStats::leaf_default(0.25, 0), FlowStats::default());
    }

    #[test]
    fn and_children_are_protected_by_earlier_ones() {
        let children = [leaf(0.5), leaf(0.2), leaf(0.1)];
        // 1 + 0.5 + 0.5 * 0.2
        assert!((and_cost(&children, false) - 1.6).abs() < 1e-12);
        // 0.5 + 0.5 + 0.1
        assert!((and_cost(&children, true) - 1.1).abs() < 1e-12);
    }

    #[test]
    fn or_children_only_see_unmatched_documents() {
        let children = [leaf(0.5), leaf(0.2)];
        // 1 + 0.5
        assert!((or_cost(&children, false) - 1.5).abs() < 1e-12);
        assert!((or_cost(&children, true) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn and_not_weights_subtracted_children() {
        let children = [leaf(0.5), leaf(0.2), leaf(0.4)];
        // 1 + 0.5 + 0.5 * 0.8
        assert!((and_not_cost(&children, false) - 1.9).abs() < 1e-12);
        assert!((and_not_cost(&children, true) - 1.4).abs() < 1e-12);
    }

    #[test]
    fn child_flows() {
        let children = [leaf(0.5), leaf(0.2), leaf(0.1)];
        let flows = and_child_flows(&children, InFlow::strict());
        assert!(flows[0].is_strict());
        assert!(!flows[1].is_strict());
        assert!((flows[2].rate() - 0.1).abs() < 1e-12);

        let flows = or_child_flows(&children, InFlow::strict());
        assert!(flows.iter().all(|f| f.is_strict()));
        let flows = or_child_flows(&children, InFlow::non_strict(1.0));
        assert!((flows[2].rate() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn force_strict_threshold() {
        let stats = leaf(0.25);
        assert!(InFlow::from(true).prefers_strict(&stats));
        assert!(InFlow::from(false).prefers_strict(&stats));
        assert!(InFlow::from(0.30).prefers_strict(&stats));
        assert!(InFlow::from(0.25).prefers_strict(&stats));
        assert!(!InFlow::from(0.20).prefers_strict(&stats));
    }

    #[test]
    fn strict_and_picks_cheapest_driver() {
        // an expensive, selective child should drive when strict
        let children = [leaf(0.9), FlowStats::new(0.01, 5.0, 0.01)];
        let order = and_cost_order(&children, true);
        assert_eq!(order, vec![1, 0]);
    }
}
