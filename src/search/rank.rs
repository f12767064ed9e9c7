use crate::core::types::DocId;
use crate::search::iterator::{BoxedIterator, DocCursor, SearchIterator};

/// Matches exactly like its first child; the other children are checked
/// only to contribute match data on unpack.
pub struct RankSearch<'md> {
    cursor: DocCursor,
    children: Vec<BoxedIterator<'md>>,
    strict: bool,
}

impl<'md> RankSearch<'md> {
    pub fn new(children: Vec<BoxedIterator<'md>>, strict: bool) -> Self {
        RankSearch {
            cursor: DocCursor::new(),
            children,
            strict,
        }
    }
}

impl SearchIterator for RankSearch<'_> {
    fn cursor(&self) -> &DocCursor {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut DocCursor {
        &mut self.cursor
    }

    fn name(&self) -> &'static str {
        "RankSearch"
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
        let Some(first) = self.children.first_mut() else {
            self.cursor.set_at_end();
            return;
        };
        if first.seek(doc) {
            self.cursor.set_doc(doc);
        } else if self.strict {
            if first.is_at_end() {
                self.cursor.set_at_end();
            } else {
                self.cursor.set_doc(first.doc_id());
            }
        }
    }

    fn do_unpack(&mut self, doc: DocId) {
        let mut children = self.children.iter_mut();
        if let Some(first) = children.next() {
            first.unpack(doc);
        }
        for child in children {
            if child.seek(doc) {
                child.unpack(doc);
            }
        }
    }
}
