use crate::core::types::DocId;
use crate::search::iterator::{BoxedIterator, DocCursor, SearchIterator};

/// Documents of the first child that no other child matches.
pub struct AndNotSearch<'md> {
    cursor: DocCursor,
    children: Vec<BoxedIterator<'md>>,
    strict: bool,
}

impl<'md> AndNotSearch<'md> {
    pub fn new(children: Vec<BoxedIterator<'md>>, strict: bool) -> Self {
        AndNotSearch {
            cursor: DocCursor::new(),
            children,
            strict,
        }
    }

    fn excluded(&mut self, doc: DocId) -> bool {
        self.children[1..].iter_mut().any(|c| c.seek(doc))
    }
}

impl SearchIterator for AndNotSearch<'_> {
    fn cursor(&self) -> &DocCursor {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut DocCursor {
        &mut self.cursor
    }

    fn name(&self) -> &'static str {
        "AndNotSearch"
    }

    fn is_strict(&self) -> bool {
        self.strict
    }

    fn children(&self) -> Vec<&dyn SearchIterator> {
        self.children.iter().map(|c| c.as_ref() as &dyn SearchIterator).collect()
    }

    fn init_range(&mut self, begin: DocId, end: DocId) {
        self.cursor.init_range(begin, end);
        for child in &mut self.children {
            child.init_range(begin, end);
        }
    }

    fn do_seek(&mut self, doc: DocId) {
        if self.children.is_empty() {
            self.cursor.set_at_end();
            return;
        }
        if !self.strict {
            if self.children[0].seek(doc) && !self.excluded(doc) {
                self.cursor.set_doc(doc);
            }
            return;
        }
        let end = self.cursor.end_id;
        let mut candidate = doc;
        while candidate < end {
            let positive = &mut self.children[0];
            if !positive.seek(candidate) {
                if positive.is_at_end() {
                    break;
                }
                candidate = if positive.is_strict() { positive.doc_id() } else { candidate + 1 };
                continue;
            }
            if !self.excluded(candidate) {
                self.cursor.set_doc(candidate);
                return;
            }
            candidate += 1;
        }
        self.cursor.set_at_end();
    }

    fn do_unpack(&mut self, doc: DocId) {
        if let Some(positive) = self.children.first_mut() {
            positive.unpack(doc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::iterator::collect_hits;
    use crate::search::test_util::docs;

    #[test]
    fn test_strict_subtraction() {
        let mut it = AndNotSearch::new(
            vec![docs(&[1, 2, 3, 4, 5, 6], true), docs(&[2, 5], false), docs(&[6], false)],
            true,
        );
        assert_eq!(collect_hits(&mut it, 1, 100), vec![1, 3, 4]);
    }

    #[test]
    fn test_non_strict_subtraction() {
        let mut it = AndNotSearch::new(vec![docs(&[4, 8, 9], false), docs(&[8], false)], false);
        assert_eq!(collect_hits(&mut it, 1, 20), vec![4, 9]);
    }
}
