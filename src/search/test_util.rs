use crate::core::types::DocId;
use crate::search::iterator::{BoxedIterator, DocCursor, SearchIterator};

/// Iterator over a fixed doc id list.
pub struct DocListSearch {
    cursor: DocCursor,
    docs: Vec<DocId>,
    strict: bool,
}

impl SearchIterator for DocListSearch {
    fn cursor(&self) -> &DocCursor {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut DocCursor {
        &mut self.cursor
    }

    fn name(&self) -> &'static str {
        "DocListSearch"
    }

    fn is_strict(&self) -> bool {
        self.strict
    }

    fn do_seek(&mut self, doc: DocId) {
        let idx = self.docs.partition_point(|&d| d < doc);
        match self.docs.get(idx) {
            Some(&found) if self.strict || found == doc => self.cursor.set_doc(found),
            Some(_) => {}
            None if self.strict => self.cursor.set_at_end(),
            None => {}
        }
    }

    fn do_unpack(&mut self, _doc: DocId) {}
}

pub fn docs(ids: &[DocId], strict: bool) -> BoxedIterator<'static> {
    Box::new(DocListSearch {
        cursor: DocCursor::new(),
        docs: ids.to_vec(),
        strict,
    })
}
