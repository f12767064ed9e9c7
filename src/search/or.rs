use serde_json::{Map, Value};
use crate::core::types::DocId;
use crate::search::iterator::{BoxedIterator, DocCursor, SearchIterator, END_DOC_ID};

/// Union. A strict union keeps every child strict and reports the smallest
/// child position. Also used for weak-and, which carries a target hit count.
pub struct OrSearch<'md> {
    cursor: DocCursor,
    children: Vec<BoxedIterator<'md>>,
    strict: bool,
    target_hits: Option<u32>,
}

impl<'md> OrSearch<'md> {
    pub fn new(children: Vec<BoxedIterator<'md>>, strict: bool) -> Self {
        OrSearch {
            cursor: DocCursor::new(),
            children,
            strict,
            target_hits: None,
        }
    }

    pub fn weak_and(children: Vec<BoxedIterator<'md>>, target_hits: u32, strict: bool) -> Self {
        OrSearch {
            target_hits: Some(target_hits),
            ..OrSearch::new(children, strict)
        }
    }
}

impl SearchIterator for OrSearch<'_> {
    fn cursor(&self) -> &DocCursor {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut DocCursor {
        &mut self.cursor
    }

    fn name(&self) -> &'static str {
        if self.target_hits.is_some() { "WeakAndSearch" } else { "OrSearch" }
    }

    fn is_strict(&self) -> bool {
        self.strict
    }

    fn children(&self) -> Vec<&dyn SearchIterator> {
        self.children.iter().map(|c| c.as_ref() as &dyn SearchIterator).collect()
    }

    fn params(&self) -> Map<String, Value> {
        let mut map = Map::new();
        if let Some(target) = self.target_hits {
            map.insert("target_hits".to_string(), Value::from(target));
        }
        map
    }

    fn init_range(&mut self, begin: DocId, end: DocId) {
        self.cursor.init_range(begin, end);
        for child in &mut self.children {
            child.init_range(begin, end);
        }
    }

    fn do_seek(&mut self, doc: DocId) {
        if !self.strict {
            if self.children.iter_mut().any(|c| c.seek(doc)) {
                self.cursor.set_doc(doc);
            }
            return;
        }
        let mut best = END_DOC_ID;
        for child in &mut self.children {
            let hit = child.seek(doc);
            let pos = if hit {
                doc
            } else if child.is_strict() {
                child.doc_id()
            } else {
                END_DOC_ID
            };
            best = best.min(pos);
        }
        self.cursor.set_doc(best);
    }

    fn do_unpack(&mut self, doc: DocId) {
        for child in &mut self.children {
            if child.doc_id() == doc {
                child.unpack(doc);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::iterator::collect_hits;
    use crate::search::test_util::docs;

    #[test]
    fn test_strict_union() {
        let mut it = OrSearch::new(vec![docs(&[3, 7, 20], true), docs(&[1, 7, 9], true)], true);
        assert_eq!(collect_hits(&mut it, 1, 100), vec![1, 3, 7, 9, 20]);
    }

    #[test]
    fn test_union_respects_range_end() {
        let mut it = OrSearch::new(vec![docs(&[3, 7, 20], true), docs(&[1, 9], true)], true);
        assert_eq!(collect_hits(&mut it, 2, 10), vec![3, 7, 9]);
    }

    #[test]
    fn test_non_strict_union() {
        let mut it = OrSearch::new(vec![docs(&[3, 7], false), docs(&[5], false)], false);
        assert_eq!(collect_hits(&mut it, 1, 10), vec![3, 5, 7]);
    }

    #[test]
    fn test_weak_and_dump_carries_target() {
        let it = OrSearch::weak_and(vec![docs(&[1], true)], 42, true);
        let dump = it.dump();
        assert_eq!(dump["[type]"], "WeakAndSearch");
        assert_eq!(dump["target_hits"], 42);
        assert_eq!(dump["children"].as_array().map(|c| c.len()), Some(1));
    }
}
