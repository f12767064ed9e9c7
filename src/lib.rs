pub mod core;
pub mod blueprint;
pub mod search;
pub mod index;
pub mod query;

pub use crate::blueprint::{
    optimize_and_sort, FieldSpec, FlowStats, HitEstimate, InFlow, LeafSpec, NodeId, Operator, Options,
    PlanTree, State,
};
pub use crate::core::config::PlannerConfig;
pub use crate::core::error::{Error, ErrorKind, Result};

/*
┌──────────────────────────────────────────────────────────────────────────────┐
│                           QUERYEVAL ARCHITECTURE                             │
└──────────────────────────────────────────────────────────────────────────────┘

  query::ast::Query ──► query::builder::PlanBuilder ──► blueprint::PlanTree
        │                   │ resolves terms in             │ (arena of nodes,
        │                   │ index::TermIndex              │  lazy State cache)
        │                   │ allocates handles in          │
        │                   ▼ MatchDataLayout               ▼
        │             ┌──────────────────────────────────────────────────────┐
        │             │ set_docid_limit ─► optimize_and_sort                 │
        │             │   flatten (And/And, Or/Or, AndNot chains)            │
        │             │   update_flow_stats (FlowStats: estimate, cost,      │
        │             │                      strict_cost)                    │
        │             │   sort (child order + strictness, Options scope)     │
        │             └──────────────────────────────────────────────────────┘
        │                                   │
        ▼                                   ▼
  query::cache::PlanCache ◄──── Arc<BuiltPlan> (immutable, shared)
                                            │ create_search(&MatchData)
                                            ▼
                         search::iterator::SearchIterator tree
                 AndSearch / OrSearch / AndNotSearch / RankSearch / NearSearch
                        └─ leaves: PostingIterator, BitVectorIterator
                                            │ seek / unpack
                                            ▼
                        search::executor::QueryExecutor ─► SearchResults
*/
