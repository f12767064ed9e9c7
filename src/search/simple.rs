use crate::core::types::DocId;
use crate::search::iterator::{DocCursor, SearchIterator};

/// Matches nothing.
#[derive(Debug, Default)]
pub struct EmptySearch {
    cursor: DocCursor,
}

impl EmptySearch {
    pub fn new() -> Self {
        EmptySearch::default()
    }
}

impl SearchIterator for EmptySearch {
    fn cursor(&self) -> &DocCursor {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut DocCursor {
        &mut self.cursor
    }

    fn name(&self) -> &'static str {
        "EmptySearch"
    }

    fn is_strict(&self) -> bool {
        true
    }

    fn init_range(&mut self, begin: DocId, end: DocId) {
        self.cursor.init_range(begin, end);
        self.cursor.set_at_end();
    }

    fn do_seek(&mut self, _doc: DocId) {
        self.cursor.set_at_end();
    }

    fn do_unpack(&mut self, _doc: DocId) {}
}

/// Matches every document in range.
#[derive(Debug)]
pub struct FullSearch {
    cursor: DocCursor,
    strict: bool,
}

impl FullSearch {
    pub fn new(strict: bool) -> Self {
        FullSearch {
            cursor: DocCursor::new(),
            strict,
        }
    }
}

impl SearchIterator for FullSearch {
    fn cursor(&self) -> &DocCursor {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut DocCursor {
        &mut self.cursor
    }

    fn name(&self) -> &'static str {
        "FullSearch"
    }

    fn is_strict(&self) -> bool {
        self.strict
    }

    fn do_seek(&mut self, doc: DocId) {
        self.cursor.set_doc(doc);
    }

    fn do_unpack(&mut self, _doc: DocId) {}
}
