use crate::core::types::DocId;
use crate::search::iterator::{BoxedIterator, DocCursor, SearchIterator};

/// Intersection. When strict, the first child drives and the others are
/// checked at each candidate.
pub struct AndSearch<'md> {
    cursor: DocCursor,
    children: Vec<BoxedIterator<'md>>,
    strict: bool,
}

impl<'md> AndSearch<'md> {
    pub fn new(children: Vec<BoxedIterator<'md>>, strict: bool) -> Self {
        AndSearch {
            cursor: DocCursor::new(),
            children,
            strict,
        }
    }
}

/// Next candidate for a strict conjunction driven by `children[0]`, or
/// `None` once the driver is exhausted. Shared by the proximity iterators.
pub(crate) fn next_and_candidate(children: &mut [BoxedIterator<'_>], mut candidate: DocId, end: DocId) -> Option<DocId> {
    loop {
        if candidate >= end {
            return None;
        }
        let (driver, rest) = children.split_first_mut()?;
        if !driver.seek(candidate) {
            if driver.is_at_end() {
                return None;
            }
            if driver.is_strict() {
                candidate = driver.doc_id();
            } else {
                candidate += 1;
            }
            continue;
        }
        if rest.iter_mut().all(|c| c.seek(candidate)) {
            return Some(candidate);
        }
        candidate += 1;
    }
}

impl SearchIterator for AndSearch<'_> {
    fn cursor(&self) -> &DocCursor {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut DocCursor {
        &mut self.cursor
    }

    fn name(&self) -> &'static str {
        "AndSearch"
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
        if !self.strict {
            if self.children.iter_mut().all(|c| c.seek(doc)) {
                self.cursor.set_doc(doc);
            }
            return;
        }
        match next_and_candidate(&mut self.children, doc, self.cursor.end_id) {
            Some(found) => self.cursor.set_doc(found),
            None => self.cursor.set_at_end(),
        }
    }

    fn do_unpack(&mut self, doc: DocId) {
        for child in &mut self.children {
            child.unpack(doc);
        }
    }
}
