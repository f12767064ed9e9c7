use serde::{Deserialize, Serialize};
use crate::blueprint::options::Options;

/// Planner configuration, typically loaded once per search node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub sort_by_cost: bool,
    pub allow_force_strict: bool,
    pub keep_order: bool,
    pub topmost_strict: bool,
    pub plan_cache_size: usize,    // Optimized plans kept by PlanCache
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            sort_by_cost: false,
            allow_force_strict: false,
            keep_order: false,
            topmost_strict: true,
            plan_cache_size: 256,
        }
    }
}

impl PlannerConfig {
    /// The optimizer options this configuration binds during planning.
    pub fn options(&self) -> Options {
        Options::default()
            .with_sort_by_cost(self.sort_by_cost)
            .with_allow_force_strict(self.allow_force_strict)
            .with_keep_order(self.keep_order)
    }
}
