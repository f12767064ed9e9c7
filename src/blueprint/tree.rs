//! Arena-backed plan tree.
//!
//! Nodes live in a flat vector and refer to each other by [`NodeId`]. Every
//! attached node has exactly one parent; a node without a parent is either
//! the root or detached (freshly created or removed from its parent).
//! Structural and estimate edits clear the cached [`State`] of the edited
//! node and all of its ancestors; states are rebuilt on the next read.

use tracing::warn;
use crate::blueprint::estimate::HitEstimate;
use crate::blueprint::field::{mix_children_fields, FieldSpec, FieldSpecList};
use crate::blueprint::flow::{self, FlowStats, InFlow};
use crate::blueprint::node::{LeafData, LeafSpec, Node, NodeId, NodeKind, Operator};
use crate::blueprint::options::Options;
use crate::blueprint::state::{State, COST_TIER_NORMAL};
use crate::core::error::{Error, Result};

#[derive(Debug, Default)]
pub struct PlanTree {
    nodes: Vec<Option<Node>>,
    root: Option<NodeId>,
}

impl PlanTree {
    pub fn new() -> Self {
        PlanTree::default()
    }

    // ---- construction ------------------------------------------------------

    /// Create a detached leaf.
    pub fn add_leaf(&mut self, spec: LeafSpec) -> NodeId {
        let estimate = spec.estimate.unwrap_or_else(|| spec.source.estimate());
        let cost_tier = spec.cost_tier.unwrap_or_else(|| spec.source.cost_tier());
        self.push(Node::new(NodeKind::Leaf(LeafData {
            source: spec.source,
            estimate,
            fields: spec.fields,
            cost_tier,
        })))
    }

    /// Create a detached intermediate node without children.
    pub fn add_intermediate(&mut self, op: Operator) -> NodeId {
        self.push(Node::new(NodeKind::Intermediate(op)))
    }

    /// Create an intermediate node and attach `children` in order.
    pub fn intermediate<I>(&mut self, op: Operator, children: I) -> Result<NodeId>
    where
        I: IntoIterator<Item = NodeId>,
    {
        let id = self.add_intermediate(op);
        for child in children {
            self.add_child(id, child)?;
        }
        Ok(id)
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let len = self.try_node(parent)?.children.len();
        self.insert_child(parent, len, child)
    }

    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        self.check_attachable(parent, child)?;
        let node = self.node_mut(parent);
        if index > node.children.len() {
            return Err(Error::invalid_argument(format!(
                "child position {} out of range for {} with {} children",
                index, parent, node.children.len()
            )));
        }
        node.children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
        self.notify_change(parent);
        Ok(())
    }

    /// Detach the child at `index`; the returned subtree stays in the arena
    /// and can be attached again.
    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> Result<NodeId> {
        let node = self.try_node(parent)?;
        if index >= node.children.len() {
            return Err(Error::invalid_argument(format!(
                "no child at position {} of {}", index, parent
            )));
        }
        let child = self.node_mut(parent).children.remove(index);
        self.node_mut(child).parent = None;
        self.notify_change(parent);
        Ok(child)
    }

    pub fn set_root(&mut self, id: NodeId) -> Result<()> {
        if self.try_node(id)?.parent.is_some() {
            return Err(Error::invalid_argument(format!("{} is attached below another node", id)));
        }
        self.root = Some(id);
        Ok(())
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Drop a detached subtree from the arena.
    pub fn discard(&mut self, id: NodeId) -> Result<()> {
        if self.try_node(id)?.parent.is_some() {
            return Err(Error::invalid_argument(format!("{} is still attached", id)));
        }
        if self.root == Some(id) {
            self.root = None;
        }
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes[next.index()].take() {
                pending.extend(node.children);
            }
        }
        Ok(())
    }

    /// Replace the estimate of a leaf; ancestors pick it up on next read.
    pub fn set_estimate(&mut self, leaf: NodeId, estimate: HitEstimate) -> Result<()> {
        match &mut self.try_node_mut(leaf)?.kind {
            NodeKind::Leaf(data) => data.estimate = estimate,
            NodeKind::Intermediate(_) => {
                return Err(Error::invalid_argument(format!("{} is not a leaf", leaf)));
            }
        }
        self.notify_change(leaf);
        Ok(())
    }

    pub fn set_source_id(&mut self, id: NodeId, source_id: u32) {
        self.node_mut(id).source_id = source_id;
    }

    // ---- accessors ---------------------------------------------------------

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.get(id.index()).is_some_and(|n| n.is_some())
    }

    /// Number of live nodes in the arena, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        matches!(self.node(id).kind, NodeKind::Leaf(_))
    }

    pub fn operator(&self, id: NodeId) -> Option<Operator> {
        self.node(id).operator()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.node(id).children.len()
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.node(id).children.get(index).copied()
    }

    pub fn state(&self, id: NodeId) -> &State {
        self.node(id).state.get_or_init(|| self.calculate_state(id))
    }

    pub fn hit_estimate(&self, id: NodeId) -> HitEstimate {
        self.state(id).estimate
    }

    pub fn field_list(&self, id: NodeId) -> &[FieldSpec] {
        &self.state(id).fields
    }

    pub fn flow_stats(&self, id: NodeId) -> FlowStats {
        self.node(id).flow
    }

    /// Relative estimate from the last flow-stats update.
    pub fn estimate(&self, id: NodeId) -> f64 {
        self.node(id).flow.estimate
    }

    pub fn cost(&self, id: NodeId) -> f64 {
        self.node(id).flow.cost
    }

    pub fn strict_cost(&self, id: NodeId) -> f64 {
        self.node(id).flow.strict_cost
    }

    pub fn strict(&self, id: NodeId) -> bool {
        self.node(id).strict
    }

    pub fn source_id(&self, id: NodeId) -> u32 {
        self.node(id).source_id
    }

    pub fn docid_limit(&self, id: NodeId) -> u32 {
        self.node(id).docid_limit
    }

    /// Enumeration id; 0 until [`enumerate`](Self::enumerate) runs.
    pub fn id(&self, id: NodeId) -> u32 {
        self.node(id).id
    }

    // ---- whole-subtree operations ------------------------------------------

    /// Set the docid limit on `id` and every node below it.
    pub fn set_docid_limit(&mut self, id: NodeId, limit: u32) {
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let node = self.node_mut(next);
            node.docid_limit = limit;
            node.invalidate();
            pending.extend(node.children.iter().copied());
        }
        self.notify_change(id);
    }

    /// Number the subtree in pre-order starting at `start`; returns the
    /// next unused number.
    pub fn enumerate(&mut self, id: NodeId, start: u32) -> u32 {
        let mut next = start;
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let node = self.node_mut(current);
            node.id = next;
            next += 1;
            pending.extend(node.children.iter().rev().copied());
        }
        next
    }

    pub fn each_node_pre_order<F: FnMut(NodeId)>(&self, id: NodeId, f: &mut F) {
        f(id);
        for &child in self.children(id) {
            self.each_node_pre_order(child, f);
        }
    }

    pub fn each_node_post_order<F: FnMut(NodeId)>(&self, id: NodeId, f: &mut F) {
        for &child in self.children(id) {
            self.each_node_post_order(child, f);
        }
        f(id);
    }

    /// Recompute flow stats bottom-up against `docid_limit`.
    pub fn update_flow_stats(&mut self, id: NodeId, docid_limit: u32) {
        let children = self.children(id).to_vec();
        for child in children {
            self.update_flow_stats(child, docid_limit);
        }
        let stats = self.calculate_flow_stats(id, docid_limit);
        self.node_mut(id).flow = stats;
    }

    // ---- internals -----------------------------------------------------------

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(node));
        id
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        match self.nodes.get(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("unknown plan node {}", id),
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("unknown plan node {}", id),
        }
    }

    fn try_node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.index())
            .and_then(|n| n.as_ref())
            .ok_or_else(|| Error::not_found(format!("plan node {}", id)))
    }

    fn try_node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .and_then(|n| n.as_mut())
            .ok_or_else(|| Error::not_found(format!("plan node {}", id)))
    }

    fn check_attachable(&self, parent: NodeId, child: NodeId) -> Result<()> {
        if matches!(self.try_node(parent)?.kind, NodeKind::Leaf(_)) {
            return Err(Error::invalid_argument(format!("{} is a leaf and cannot own children", parent)));
        }
        if self.try_node(child)?.parent.is_some() {
            return Err(Error::invalid_argument(format!("{} already has a parent", child)));
        }
        if self.root == Some(child) {
            return Err(Error::invalid_argument(format!("{} is the tree root", child)));
        }
        let mut current = Some(parent);
        while let Some(id) = current {
            if id == child {
                return Err(Error::invalid_argument(format!(
                    "attaching {} below {} would create a cycle", child, parent
                )));
            }
            current = self.node(id).parent;
        }
        Ok(())
    }

    /// Clear cached state from `id` up to its root.
    pub(crate) fn notify_change(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(next) = current {
            let node = self.node_mut(next);
            node.invalidate();
            current = node.parent;
        }
    }

    /// Replace the child list of `id` wholesale, fixing parent links.
    pub(crate) fn replace_children(&mut self, id: NodeId, children: Vec<NodeId>) {
        for &child in &children {
            self.node_mut(child).parent = Some(id);
        }
        self.node_mut(id).children = children;
        self.notify_change(id);
    }

    /// Remove a node whose children have already been moved elsewhere.
    pub(crate) fn free_node(&mut self, id: NodeId) {
        debug_assert!(self.node(id).children.is_empty());
        self.nodes[id.index()] = None;
    }

    fn calculate_state(&self, id: NodeId) -> State {
        let node = self.node(id);
        let state = match &node.kind {
            NodeKind::Leaf(leaf) => State {
                estimate: leaf.estimate,
                fields: leaf.fields.clone(),
                cost_tier: leaf.cost_tier,
                tree_size: 1,
                allow_termwise_eval: true,
            },
            NodeKind::Intermediate(op) => {
                let children: Vec<&State> = node.children.iter().map(|&c| self.state(c)).collect();
                State {
                    estimate: combine(*op, &children),
                    fields: self.expose_fields(id, *op, &children),
                    cost_tier: cost_tier(*op, &children),
                    tree_size: 1 + children.iter().map(|s| s.tree_size).sum::<u32>(),
                    allow_termwise_eval: op.supports_termwise_children()
                        && children.iter().all(|s| s.allow_termwise_eval),
                }
            }
        };
        State {
            estimate: state.estimate.clamped(node.docid_limit),
            ..state
        }
    }

    fn expose_fields(&self, id: NodeId, op: Operator, children: &[&State]) -> FieldSpecList {
        if op != Operator::Or {
            return FieldSpecList::new();
        }
        let fields = mix_children_fields(children.iter().map(|s| s.fields.as_slice()));
        if fields.is_empty() && !children.is_empty() && children.iter().all(|s| !s.fields.is_empty()) {
            warn!(node = %id, "conflicting field handles below disjunction; exposing no fields");
        }
        fields
    }

    fn calculate_flow_stats(&self, id: NodeId, docid_limit: u32) -> FlowStats {
        if docid_limit == 0 {
            return FlowStats::default();
        }
        let node = self.node(id);
        let estimate = self.state(id).estimate.relative(docid_limit);
        let op = match &node.kind {
            NodeKind::Leaf(leaf) => {
                return leaf.source.calculate_flow_stats(self.state(id).estimate, docid_limit);
            }
            NodeKind::Intermediate(op) => *op,
        };
        let children: Vec<FlowStats> = node.children.iter().map(|&c| self.node(c).flow).collect();
        let opts = Options::current();
        let by_cost = opts.sort_by_cost() && !opts.keep_order() && op.is_reorderable();
        let (cost, strict_cost) = match op {
            Operator::And | Operator::Near { .. } | Operator::ONear { .. } => {
                if by_cost {
                    let loose = reorder(&children, &flow::and_cost_order(&children, false));
                    let strict = reorder(&children, &flow::and_cost_order(&children, true));
                    (flow::and_cost(&loose, false), flow::and_cost(&strict, true))
                } else {
                    (flow::and_cost(&children, false), flow::and_cost(&children, true))
                }
            }
            Operator::Or | Operator::WeakAnd { .. } => {
                let loose = if by_cost {
                    reorder(&children, &flow::or_cost_order(&children, false))
                } else {
                    children.clone()
                };
                (flow::or_cost(&loose, false), flow::or_cost(&children, true))
            }
            Operator::AndNot => {
                let ordered = if by_cost && children.len() > 1 {
                    let mut ordered = vec![children[0]];
                    let rest = &children[1..];
                    ordered.extend(reorder(rest, &flow::or_cost_order(rest, false)));
                    ordered
                } else {
                    children.clone()
                };
                (flow::and_not_cost(&ordered, false), flow::and_not_cost(&ordered, true))
            }
            Operator::Rank => (flow::rank_cost(&children, false), flow::rank_cost(&children, true)),
        };
        FlowStats::new(estimate, cost, strict_cost)
    }

    /// In-flows for the children of `id` in their current order.
    pub(crate) fn child_flows(&self, id: NodeId, in_flow: InFlow) -> Vec<InFlow> {
        let node = self.node(id);
        let children: Vec<FlowStats> = node.children.iter().map(|&c| self.node(c).flow).collect();
        match node.operator() {
            None => Vec::new(),
            Some(Operator::And | Operator::Near { .. } | Operator::ONear { .. }) => {
                flow::and_child_flows(&children, in_flow)
            }
            Some(Operator::Or | Operator::WeakAnd { .. }) => flow::or_child_flows(&children, in_flow),
            Some(Operator::AndNot) => flow::and_not_child_flows(&children, in_flow),
            Some(Operator::Rank) => flow::rank_child_flows(&children, in_flow),
        }
    }
}

fn reorder(children: &[FlowStats], order: &[usize]) -> Vec<FlowStats> {
    order.iter().map(|&i| children[i]).collect()
}

fn combine(op: Operator, children: &[&State]) -> HitEstimate {
    let estimates = children.iter().map(|s| s.estimate);
    match op {
        Operator::And | Operator::Near { .. } | Operator::ONear { .. } => HitEstimate::min_of(estimates),
        Operator::Or | Operator::WeakAnd { .. } => HitEstimate::max_of(estimates),
        Operator::AndNot | Operator::Rank => children.first().map(|s| s.estimate).unwrap_or_default(),
    }
}

fn cost_tier(op: Operator, children: &[&State]) -> u8 {
    let tiers = children.iter().map(|s| s.cost_tier);
    let tier = match op {
        Operator::Or | Operator::WeakAnd { .. } => tiers.max(),
        _ => tiers.min(),
    };
    tier.unwrap_or(COST_TIER_NORMAL)
}
