//! Document-id iterator protocol shared by every runtime search node.
//!
//! An iterator walks the half-open range `[begin, end)` set by
//! [`SearchIterator::init_range`]. Before the first seek it sits at
//! `begin - 1`. A strict iterator's `seek(doc)` moves to the first match at
//! or after `doc`; a non-strict one only answers whether `doc` matches and
//! leaves its position untouched on a miss.

use serde_json::{Map, Value};
use crate::core::types::{DocId, BEGIN_ID};

/// Position reported once an iterator is exhausted.
pub const END_DOC_ID: DocId = DocId::MAX;

/// Which side of the exact result a filter iterator may err on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterConstraint {
    /// May produce extra documents but never misses a hit.
    UpperBound,
    /// May miss documents but never produces a false hit.
    LowerBound,
}

impl FilterConstraint {
    pub fn invert(self) -> Self {
        match self {
            FilterConstraint::UpperBound => FilterConstraint::LowerBound,
            FilterConstraint::LowerBound => FilterConstraint::UpperBound,
        }
    }
}

/// Position and range bookkeeping embedded in every iterator.
#[derive(Debug, Clone, Copy)]
pub struct DocCursor {
    pub doc_id: DocId,
    pub end_id: DocId,
}

impl DocCursor {
    pub fn new() -> Self {
        DocCursor {
            doc_id: BEGIN_ID - 1,
            end_id: END_DOC_ID,
        }
    }

    pub fn init_range(&mut self, begin: DocId, end: DocId) {
        self.doc_id = begin.saturating_sub(1);
        self.end_id = end;
    }

    pub fn set_at_end(&mut self) {
        self.doc_id = END_DOC_ID;
    }

    /// Move to `doc`, or to the end if `doc` is outside the range.
    pub fn set_doc(&mut self, doc: DocId) {
        self.doc_id = if doc >= self.end_id { END_DOC_ID } else { doc };
    }

    pub fn is_at_end(&self) -> bool {
        self.doc_id >= self.end_id
    }
}

impl Default for DocCursor {
    fn default() -> Self {
        DocCursor::new()
    }
}

pub trait SearchIterator {
    fn cursor(&self) -> &DocCursor;

    fn cursor_mut(&mut self) -> &mut DocCursor;

    /// Type name used in dumps.
    fn name(&self) -> &'static str;

    fn is_strict(&self) -> bool;

    /// Advance towards `doc`; see the module docs for the strict contract.
    fn do_seek(&mut self, doc: DocId);

    /// Fill match data for `doc`, which the iterator currently matches.
    fn do_unpack(&mut self, doc: DocId);

    fn children(&self) -> Vec<&dyn SearchIterator> {
        Vec::new()
    }

    /// Operator parameters included in dumps, e.g. a window size.
    fn params(&self) -> Map<String, Value> {
        Map::new()
    }

    fn init_range(&mut self, begin: DocId, end: DocId) {
        self.cursor_mut().init_range(begin, end);
    }

    fn doc_id(&self) -> DocId {
        self.cursor().doc_id
    }

    fn is_at_end(&self) -> bool {
        self.cursor().is_at_end()
    }

    fn seek(&mut self, doc: DocId) -> bool {
        if doc == self.doc_id() {
            return !self.is_at_end();
        }
        if doc < self.doc_id() && self.is_strict() {
            return false;
        }
        self.do_seek(doc);
        self.doc_id() == doc
    }

    fn unpack(&mut self, doc: DocId) {
        self.do_unpack(doc);
    }

    fn dump(&self) -> Value {
        let mut map = Map::new();
        map.insert("[type]".to_string(), Value::String(self.name().to_string()));
        map.insert("strict".to_string(), Value::Bool(self.is_strict()));
        map.extend(self.params());
        let children = self.children();
        if !children.is_empty() {
            map.insert(
                "children".to_string(),
                Value::Array(children.into_iter().map(|c| c.dump()).collect()),
            );
        }
        Value::Object(map)
    }

    /// Compact `Name[strict](child, ...)` signature.
    fn as_string(&self) -> String {
        let mut out = String::from(self.name());
        if self.is_strict() {
            out.push_str("[strict]");
        }
        let children = self.children();
        if !children.is_empty() {
            let inner: Vec<String> = children.iter().map(|c| c.as_string()).collect();
            out.push('(');
            out.push_str(&inner.join(", "));
            out.push(')');
        }
        out
    }
}

/// Owned, type-erased iterator bound to match data living for `'md`.
pub type BoxedIterator<'md> = Box<dyn SearchIterator + 'md>;

/// Visit every match of `it` in `[begin, end)`. Strict iterators skip ahead;
/// non-strict ones are checked document by document.
pub fn drive<F>(it: &mut dyn SearchIterator, begin: DocId, end: DocId, mut on_hit: F)
where
    F: FnMut(&mut dyn SearchIterator, DocId),
{
    it.init_range(begin, end);
    let mut doc = begin;
    while doc < end {
        if it.seek(doc) {
            on_hit(&mut *it, doc);
            doc += 1;
        } else if it.is_strict() {
            if it.is_at_end() {
                break;
            }
            doc = it.doc_id().max(doc + 1);
        } else {
            doc += 1;
        }
    }
}

/// Collect every document `it` produces inside `[begin, end)`.
pub fn collect_hits(it: &mut dyn SearchIterator, begin: DocId, end: DocId) -> Vec<DocId> {
    let mut hits = Vec::new();
    drive(it, begin, end, |_, doc| hits.push(doc));
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_range() {
        let mut cursor = DocCursor::new();
        cursor.init_range(1, 10);
        assert_eq!(cursor.doc_id, 0);
        assert!(!cursor.is_at_end());
        cursor.set_doc(10);
        assert!(cursor.is_at_end());
        assert_eq!(cursor.doc_id, END_DOC_ID);
    }

    #[test]
    fn test_constraint_invert() {
        assert_eq!(FilterConstraint::UpperBound.invert(), FilterConstraint::LowerBound);
        assert_eq!(FilterConstraint::LowerBound.invert(), FilterConstraint::UpperBound);
    }
}
