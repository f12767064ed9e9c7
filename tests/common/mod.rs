#![allow(dead_code)]

use std::sync::Arc;
use queryeval::blueprint::node::{LeafSpec, NodeId, Operator};
use queryeval::blueprint::tree::PlanTree;
use queryeval::index::source::FakeSource;
use queryeval::HitEstimate;

/// Detached leaf estimating `hits` with the given `(field_id, handle)` bindings.
pub fn leaf(tree: &mut PlanTree, hits: u32, fields: &[(u32, u32)]) -> NodeId {
    let mut spec = LeafSpec::new(FakeSource::hits(hits));
    for &(field_id, handle) in fields {
        spec = spec.field(field_id, handle);
    }
    tree.add_leaf(spec)
}

/// Leaf that can be proven to match nothing.
pub fn empty_leaf(tree: &mut PlanTree) -> NodeId {
    tree.add_leaf(LeafSpec::new(FakeSource::hits(0)).estimate(HitEstimate::empty()))
}

/// Leaf matching exactly `docs`, estimating `docs.len()` hits.
pub fn doc_leaf(tree: &mut PlanTree, docs: &[u32], field: (u32, u32)) -> NodeId {
    let source = FakeSource::new(format!("docs:{:?}", docs), HitEstimate::hits(docs.len() as u32))
        .with_docs(docs.iter().copied());
    tree.add_leaf(LeafSpec::new(Arc::new(source)).field(field.0, field.1))
}

pub fn node(tree: &mut PlanTree, op: Operator, children: Vec<NodeId>) -> NodeId {
    tree.intermediate(op, children).expect("valid children")
}

/// Compact structural signature: leaves print as `hits@handles`.
pub fn signature(tree: &PlanTree, id: NodeId) -> String {
    if tree.is_leaf(id) {
        let handles: Vec<String> = tree.field_list(id).iter().map(|f| f.handle.to_string()).collect();
        return format!("{}@{}", tree.hit_estimate(id).est_hits, handles.join("+"));
    }
    let name = match tree.operator(id) {
        Some(Operator::And) => "And",
        Some(Operator::Or) => "Or",
        Some(Operator::AndNot) => "AndNot",
        Some(Operator::Rank) => "Rank",
        Some(Operator::Near { .. }) => "Near",
        Some(Operator::ONear { .. }) => "ONear",
        Some(Operator::WeakAnd { .. }) => "WeakAnd",
        None => unreachable!(),
    };
    let children: Vec<String> = tree.children(id).iter().map(|&c| signature(tree, c)).collect();
    format!("{}({})", name, children.join(", "))
}

pub fn root_signature(tree: &PlanTree) -> String {
    signature(tree, tree.root().expect("root set"))
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
