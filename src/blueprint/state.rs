use serde::Serialize;
use crate::blueprint::estimate::HitEstimate;
use crate::blueprint::field::{FieldSpec, FieldSpecList};

pub const COST_TIER_NORMAL: u8 = 1;
pub const COST_TIER_EXPENSIVE: u8 = 2;

/// Cached per-node summary, recomputed lazily after structural changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct State {
    pub estimate: HitEstimate,
    pub fields: FieldSpecList,
    pub cost_tier: u8,
    pub tree_size: u32,
    pub allow_termwise_eval: bool,
}

impl State {
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, idx: usize) -> Option<&FieldSpec> {
        self.fields.get(idx)
    }

    pub fn lookup_field(&self, field_id: u32) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.field_id == field_id)
    }
}
