pub mod estimate;
pub mod field;
pub mod state;
pub mod flow;
pub mod options;
pub mod node;
pub mod tree;
pub mod optimize;
pub mod dump;
pub mod materialize;

pub use estimate::HitEstimate;
pub use field::{FieldSpec, FieldSpecList};
pub use flow::{FlowStats, InFlow};
pub use node::{LeafSpec, NodeId, Operator};
pub use optimize::optimize_and_sort;
pub use options::{Options, OptionsGuard};
pub use state::State;
pub use tree::PlanTree;
