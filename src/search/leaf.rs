//! Leaf iterators over index structures.

use std::cell::RefCell;
use std::sync::Arc;
use roaring::RoaringBitmap;
use serde_json::{Map, Value};
use crate::core::types::DocId;
use crate::index::posting::PostingList;
use crate::index::skiplist::SkipList;
use crate::search::iterator::{DocCursor, SearchIterator};
use crate::search::match_data::TermFieldMatchData;

/// Walks a posting list; unpack copies positions into match data.
pub struct PostingIterator<'md> {
    cursor: DocCursor,
    postings: Arc<PostingList>,
    skips: Arc<SkipList>,
    pos: usize,
    tfmd: Option<&'md RefCell<TermFieldMatchData>>,
    strict: bool,
}

impl<'md> PostingIterator<'md> {
    pub fn new(
        postings: Arc<PostingList>,
        skips: Arc<SkipList>,
        tfmd: Option<&'md RefCell<TermFieldMatchData>>,
        strict: bool,
    ) -> Self {
        PostingIterator {
            cursor: DocCursor::new(),
            postings,
            skips,
            pos: 0,
            tfmd,
            strict,
        }
    }
}

impl SearchIterator for PostingIterator<'_> {
    fn cursor(&self) -> &DocCursor {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut DocCursor {
        &mut self.cursor
    }

    fn name(&self) -> &'static str {
        "PostingIterator"
    }

    fn is_strict(&self) -> bool {
        self.strict
    }

    fn params(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("doc_freq".to_string(), Value::from(self.postings.doc_freq()));
        map.insert("unpacks".to_string(), Value::Bool(self.tfmd.is_some()));
        map
    }

    fn init_range(&mut self, begin: DocId, end: DocId) {
        self.cursor.init_range(begin, end);
        self.pos = 0;
    }

    fn do_seek(&mut self, doc: DocId) {
        self.pos = self.skips.skip_to_ge(doc, self.pos);
        match self.skips.doc_ids.get(self.pos) {
            Some(&found) if self.strict || found == doc => self.cursor.set_doc(found),
            Some(_) => {}
            None if self.strict => self.cursor.set_at_end(),
            None => {}
        }
    }

    fn do_unpack(&mut self, doc: DocId) {
        let Some(tfmd) = self.tfmd else {
            return;
        };
        let mut tfmd = tfmd.borrow_mut();
        tfmd.reset(doc);
        if let Some(posting) = self.postings.postings.get(self.pos).filter(|p| p.doc_id == doc) {
            tfmd.positions.extend_from_slice(&posting.positions);
        }
    }
}

/// Membership test against a bitmap; never produces match data positions.
pub struct BitVectorIterator<'md> {
    cursor: DocCursor,
    bits: Arc<RoaringBitmap>,
    tfmd: Option<&'md RefCell<TermFieldMatchData>>,
    strict: bool,
}

impl<'md> BitVectorIterator<'md> {
    pub fn new(bits: Arc<RoaringBitmap>, tfmd: Option<&'md RefCell<TermFieldMatchData>>, strict: bool) -> Self {
        BitVectorIterator {
            cursor: DocCursor::new(),
            bits,
            tfmd,
            strict,
        }
    }

    fn next_set_bit(&self, doc: DocId) -> Option<DocId> {
        let skipped = if doc == 0 { 0 } else { self.bits.rank(doc - 1) };
        self.bits.select(skipped as u32)
    }
}

impl SearchIterator for BitVectorIterator<'_> {
    fn cursor(&self) -> &DocCursor {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut DocCursor {
        &mut self.cursor
    }

    fn name(&self) -> &'static str {
        "BitVectorIterator"
    }

    fn is_strict(&self) -> bool {
        self.strict
    }

    fn params(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("cardinality".to_string(), Value::from(self.bits.len()));
        map
    }

    fn do_seek(&mut self, doc: DocId) {
        if !self.strict {
            if self.bits.contains(doc) {
                self.cursor.set_doc(doc);
            }
            return;
        }
        match self.next_set_bit(doc) {
            Some(found) => self.cursor.set_doc(found),
            None => self.cursor.set_at_end(),
        }
    }

    fn do_unpack(&mut self, doc: DocId) {
        if let Some(tfmd) = self.tfmd {
            tfmd.borrow_mut().reset(doc);
        }
    }
}
