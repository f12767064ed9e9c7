//! Translation of a [`Query`] into an unoptimized plan tree.

use std::sync::Arc;
use tracing::debug;
use crate::blueprint::node::{LeafSpec, NodeId, Operator};
use crate::blueprint::tree::PlanTree;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{FieldId, Term, TermFieldHandle};
use crate::index::posting::PostingList;
use crate::index::source::{BitVectorSource, LeafSource, PostingSource};
use crate::index::term_index::TermIndex;
use crate::query::ast::{BoolQuery, Query, TermQuery};
use crate::search::match_data::MatchDataLayout;

/// Plan tree plus the layout its leaves' handles were allocated from.
#[derive(Debug)]
pub struct BuiltPlan {
    pub tree: PlanTree,
    pub layout: MatchDataLayout,
    pub terms: Vec<(Term, TermFieldHandle)>,
}

impl BuiltPlan {
    pub fn handle_of(&self, term: &Term) -> Option<TermFieldHandle> {
        self.terms.iter().find(|(t, _)| t == term).map(|(_, h)| *h)
    }
}

pub struct PlanBuilder<'a> {
    index: &'a TermIndex,
    tree: PlanTree,
    layout: MatchDataLayout,
    terms: Vec<(Term, TermFieldHandle)>,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(index: &'a TermIndex) -> Self {
        PlanBuilder {
            index,
            tree: PlanTree::new(),
            layout: MatchDataLayout::new(),
            terms: Vec::new(),
        }
    }

    pub fn build(mut self, query: &Query) -> Result<BuiltPlan> {
        let root = self.node(query, false)?;
        self.tree.set_root(root)?;
        debug!(nodes = self.tree.node_count(), term_fields = self.layout.num_term_fields(), "built plan");
        Ok(BuiltPlan {
            tree: self.tree,
            layout: self.layout,
            terms: self.terms,
        })
    }

    fn node(&mut self, query: &Query, filter: bool) -> Result<NodeId> {
        match query {
            Query::Term(term) => self.term_leaf(term, filter),
            Query::Attribute(attr) => {
                let field_id = self.field_id(&attr.field)?;
                let source: Arc<dyn LeafSource> = match self.index.attribute(&attr.field, &attr.value) {
                    Some(source) => source as Arc<dyn LeafSource>,
                    None => Arc::new(BitVectorSource::from_docs(
                        format!("{}:{}", attr.field, attr.value),
                        std::iter::empty(),
                    )),
                };
                let handle = self.layout.alloc_term_field(field_id);
                Ok(self.tree.add_leaf(LeafSpec::new(source).filter_field(field_id, handle)))
            }
            Query::Bool(bool_query) => self.bool_node(bool_query, filter),
            Query::And(children) => self.intermediate(Operator::And, children, filter),
            Query::Or(children) => self.intermediate(Operator::Or, children, filter),
            Query::AndNot { positive, negatives } => {
                let mut ids = vec![self.node(positive, filter)?];
                for negative in negatives {
                    ids.push(self.node(negative, true)?);
                }
                self.tree.intermediate(Operator::AndNot, ids)
            }
            Query::Rank(children) => self.intermediate(Operator::Rank, children, filter),
            Query::Near(prox) => self.proximity(Operator::Near { window: prox.window }, &prox.terms, filter),
            Query::ONear(prox) => self.proximity(Operator::ONear { window: prox.window }, &prox.terms, filter),
            Query::WeakAnd { target_hits, children } => {
                self.intermediate(Operator::WeakAnd { target_hits: *target_hits }, children, filter)
            }
        }
    }

    fn intermediate(&mut self, op: Operator, children: &[Query], filter: bool) -> Result<NodeId> {
        let mut ids = Vec::with_capacity(children.len());
        for child in children {
            ids.push(self.node(child, filter)?);
        }
        self.tree.intermediate(op, ids)
    }

    fn proximity(&mut self, op: Operator, terms: &[TermQuery], filter: bool) -> Result<NodeId> {
        let mut ids = Vec::with_capacity(terms.len());
        for term in terms {
            ids.push(self.term_leaf(term, filter)?);
        }
        self.tree.intermediate(op, ids)
    }

    /// must + filter form a conjunction; should clauses rank it when there
    /// is one and match on their own otherwise; must_not subtracts.
    fn bool_node(&mut self, query: &BoolQuery, filter: bool) -> Result<NodeId> {
        let mut required = Vec::new();
        for clause in &query.must {
            required.push(self.node(clause, filter)?);
        }
        for clause in &query.filter {
            required.push(self.node(clause, true)?);
        }
        let mut optional = Vec::new();
        for clause in &query.should {
            optional.push(self.node(clause, filter)?);
        }
        let positive = match (required.is_empty(), optional.is_empty()) {
            (true, true) => {
                return Err(Error::new(
                    ErrorKind::UnsupportedQuery,
                    "bool query needs a must, filter or should clause",
                ));
            }
            (false, true) => self.tree.intermediate(Operator::And, required)?,
            (true, false) => self.tree.intermediate(Operator::Or, optional)?,
            (false, false) => {
                let and = self.tree.intermediate(Operator::And, required)?;
                let or = self.tree.intermediate(Operator::Or, optional)?;
                self.tree.intermediate(Operator::Rank, [and, or])?
            }
        };
        if query.must_not.is_empty() {
            return Ok(positive);
        }
        let mut ids = vec![positive];
        for clause in &query.must_not {
            ids.push(self.node(clause, true)?);
        }
        self.tree.intermediate(Operator::AndNot, ids)
    }

    fn term_leaf(&mut self, query: &TermQuery, filter: bool) -> Result<NodeId> {
        let field_id = self.field_id(&query.field)?;
        let term = Term::new(&query.field, &query.value);
        let source: Arc<dyn LeafSource> = match self.index.term(&term) {
            Some(source) => source as Arc<dyn LeafSource>,
            None => Arc::new(PostingSource::new(
                format!("{}:{}", query.field, query.value),
                Arc::new(PostingList::new()),
            )),
        };
        let handle = self.layout.alloc_term_field(field_id);
        self.terms.push((term, handle));
        let spec = LeafSpec::new(source);
        let spec = if filter {
            spec.filter_field(field_id, handle)
        } else {
            spec.field(field_id, handle)
        };
        Ok(self.tree.add_leaf(spec))
    }

    fn field_id(&self, field: &str) -> Result<FieldId> {
        self.index
            .field_id(field)
            .ok_or_else(|| Error::invalid_argument(format!("unknown field '{}'", field)))
    }
}
