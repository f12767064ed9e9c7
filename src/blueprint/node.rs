use std::fmt;
use std::sync::{Arc, OnceLock};
use serde::{Deserialize, Serialize};
use crate::blueprint::estimate::HitEstimate;
use crate::blueprint::field::{FieldSpec, FieldSpecList};
use crate::blueprint::flow::FlowStats;
use crate::blueprint::state::State;
use crate::core::types::{FieldId, TermFieldHandle, UNSET_DOCID_LIMIT, UNSET_SOURCE_ID};
use crate::index::source::LeafSource;

/// Handle to a node stored in a [`PlanTree`](crate::blueprint::tree::PlanTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Boolean operator of an intermediate plan node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    And,
    Or,
    /// First child is positive, the rest are subtracted.
    AndNot,
    /// First child decides matching, the rest only contribute match data.
    Rank,
    Near { window: u32 },
    ONear { window: u32 },
    WeakAnd { target_hits: u32 },
}

impl Operator {
    pub fn name(&self) -> &'static str {
        match self {
            Operator::And => "AndBlueprint",
            Operator::Or => "OrBlueprint",
            Operator::AndNot => "AndNotBlueprint",
            Operator::Rank => "RankBlueprint",
            Operator::Near { .. } => "NearBlueprint",
            Operator::ONear { .. } => "ONearBlueprint",
            Operator::WeakAnd { .. } => "WeakAndBlueprint",
        }
    }

    /// And-under-And and Or-under-Or can be merged into the parent.
    pub fn is_associative(&self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }

    /// Whether the optimizer may reorder children at all.
    pub fn is_reorderable(&self) -> bool {
        matches!(self, Operator::And | Operator::Or | Operator::AndNot | Operator::Near { .. })
    }

    pub fn supports_termwise_children(&self) -> bool {
        matches!(self, Operator::And | Operator::Or | Operator::AndNot)
    }
}

/// Everything needed to create a leaf node.
#[derive(Debug, Clone)]
pub struct LeafSpec {
    pub(crate) source: Arc<dyn LeafSource>,
    pub(crate) estimate: Option<HitEstimate>,
    pub(crate) fields: FieldSpecList,
    pub(crate) cost_tier: Option<u8>,
}

impl LeafSpec {
    pub fn new(source: Arc<dyn LeafSource>) -> Self {
        LeafSpec {
            source,
            estimate: None,
            fields: FieldSpecList::new(),
            cost_tier: None,
        }
    }

    /// Override the estimate reported by the source.
    pub fn estimate(mut self, estimate: HitEstimate) -> Self {
        self.estimate = Some(estimate);
        self
    }

    pub fn field(mut self, field_id: FieldId, handle: TermFieldHandle) -> Self {
        self.fields.push(FieldSpec::new(field_id, handle));
        self
    }

    pub fn filter_field(mut self, field_id: FieldId, handle: TermFieldHandle) -> Self {
        self.fields.push(FieldSpec::filter(field_id, handle));
        self
    }

    pub fn cost_tier(mut self, tier: u8) -> Self {
        self.cost_tier = Some(tier);
        self
    }
}

#[derive(Debug)]
pub(crate) struct LeafData {
    pub source: Arc<dyn LeafSource>,
    pub estimate: HitEstimate,
    pub fields: FieldSpecList,
    pub cost_tier: u8,
}

#[derive(Debug)]
pub(crate) enum NodeKind {
    Leaf(LeafData),
    Intermediate(Operator),
}

#[derive(Debug)]
pub(crate) struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub source_id: u32,
    pub docid_limit: u32,
    pub id: u32,
    pub strict: bool,
    pub flow: FlowStats,
    pub state: OnceLock<State>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            parent: None,
            children: Vec::new(),
            source_id: UNSET_SOURCE_ID,
            docid_limit: UNSET_DOCID_LIMIT,
            id: 0,
            strict: false,
            flow: FlowStats::default(),
            state: OnceLock::new(),
        }
    }

    pub fn operator(&self) -> Option<Operator> {
        match &self.kind {
            NodeKind::Intermediate(op) => Some(*op),
            NodeKind::Leaf(_) => None,
        }
    }

    pub fn invalidate(&mut self) {
        self.state.take();
    }
}
