//! Proximity iterators: all children must match and their term positions
//! must fall within a window, in order when built with [`NearSearch::ordered`].

use serde_json::{Map, Value};
use crate::core::types::DocId;
use crate::search::and::next_and_candidate;
use crate::search::iterator::{BoxedIterator, DocCursor, SearchIterator};
use crate::search::match_data::TermFieldMatchDataArray;

pub struct NearSearch<'md> {
    cursor: DocCursor,
    children: Vec<BoxedIterator<'md>>,
    terms: TermFieldMatchDataArray<'md>,
    window: u32,
    ordered: bool,
    strict: bool,
}

impl<'md> NearSearch<'md> {
    pub fn new(
        children: Vec<BoxedIterator<'md>>,
        terms: TermFieldMatchDataArray<'md>,
        window: u32,
        strict: bool,
    ) -> Self {
        NearSearch {
            cursor: DocCursor::new(),
            children,
            terms,
            window,
            ordered: false,
            strict,
        }
    }

    pub fn ordered(
        children: Vec<BoxedIterator<'md>>,
        terms: TermFieldMatchDataArray<'md>,
        window: u32,
        strict: bool,
    ) -> Self {
        NearSearch {
            ordered: true,
            ..NearSearch::new(children, terms, window, strict)
        }
    }

    fn within_window(&mut self, doc: DocId) -> bool {
        for child in &mut self.children {
            child.unpack(doc);
        }
        let lists: Vec<Vec<u32>> = self
            .terms
            .iter()
            .map(|slot| {
                let slot = slot.borrow();
                if slot.has_data(doc) { slot.positions.clone() } else { Vec::new() }
            })
            .collect();
        if self.ordered {
            ordered_window(&lists, self.window)
        } else {
            unordered_window(&lists, self.window)
        }
    }
}

/// Some choice of one position per list spans at most `window`.
pub(crate) fn unordered_window(lists: &[Vec<u32>], window: u32) -> bool {
    if lists.len() < 2 {
        return lists.iter().all(|l| !l.is_empty());
    }
    lists.iter().flatten().any(|&start| {
        let mut last = start;
        for list in lists {
            let idx = list.partition_point(|&p| p < start);
            match list.get(idx) {
                Some(&p) => last = last.max(p),
                None => return false,
            }
        }
        last - start <= window
    })
}

/// Strictly increasing positions, one per list in list order, spanning at
/// most `window`.
pub(crate) fn ordered_window(lists: &[Vec<u32>], window: u32) -> bool {
    let Some((first, rest)) = lists.split_first() else {
        return true;
    };
    first.iter().any(|&start| {
        let mut prev = start;
        for list in rest {
            let idx = list.partition_point(|&p| p <= prev);
            match list.get(idx) {
                Some(&p) => prev = p,
                None => return false,
            }
        }
        prev - start <= window
    })
}

impl SearchIterator for NearSearch<'_> {
    fn cursor(&self) -> &DocCursor {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut DocCursor {
        &mut self.cursor
    }

    fn name(&self) -> &'static str {
        if self.ordered { "ONearSearch" } else { "NearSearch" }
    }

    fn is_strict(&self) -> bool {
        self.strict
    }

    fn children(&self) -> Vec<&dyn SearchIterator> {
        self.children.iter().map(|c| c.as_ref() as &dyn SearchIterator).collect()
    }

    fn params(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("window".to_string(), Value::from(self.window));
        map
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
            if self.children.iter_mut().all(|c| c.seek(doc)) && self.within_window(doc) {
                self.cursor.set_doc(doc);
            }
            return;
        }
        let end = self.cursor.end_id;
        let mut candidate = doc;
        while let Some(found) = next_and_candidate(&mut self.children, candidate, end) {
            if self.within_window(found) {
                self.cursor.set_doc(found);
                return;
            }
            candidate = found + 1;
        }
        self.cursor.set_at_end();
    }

    fn do_unpack(&mut self, doc: DocId) {
        for child in &mut self.children {
            child.unpack(doc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unordered_window() {
        assert!(unordered_window(&[vec![1, 20], vec![23]], 3));
        assert!(unordered_window(&[vec![10], vec![8]], 2));
        assert!(!unordered_window(&[vec![10], vec![7]], 2));
        assert!(!unordered_window(&[vec![1], vec![]], 100));
    }

    #[test]
    fn test_ordered_window() {
        assert!(ordered_window(&[vec![1, 10], vec![12], vec![13]], 3));
        assert!(!ordered_window(&[vec![12], vec![10]], 5));
        assert!(!ordered_window(&[vec![1], vec![1]], 5));
        assert!(ordered_window(&[vec![4, 9], vec![2, 6, 11]], 2));
    }
}
