//! Per-query match data: one slot per term-field handle, filled by leaf
//! iterators during unpack.

use std::cell::RefCell;
use serde::Serialize;
use crate::core::types::{DocId, FieldId, TermFieldHandle};

/// What a leaf records about the document it last unpacked.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TermFieldMatchData {
    pub field_id: FieldId,
    pub doc_id: DocId,
    pub positions: Vec<u32>,
}

impl TermFieldMatchData {
    pub fn new(field_id: FieldId) -> Self {
        TermFieldMatchData {
            field_id,
            ..Default::default()
        }
    }

    pub fn reset(&mut self, doc_id: DocId) {
        self.doc_id = doc_id;
        self.positions.clear();
    }

    pub fn append_position(&mut self, position: u32) {
        self.positions.push(position);
    }

    /// Whether the slot was filled for `doc_id`.
    pub fn has_data(&self, doc_id: DocId) -> bool {
        self.doc_id == doc_id
    }
}

/// Slots referenced by the iterators of one materialized plan.
pub type TermFieldMatchDataArray<'md> = Vec<&'md RefCell<TermFieldMatchData>>;

#[derive(Debug, Default)]
pub struct MatchData {
    slots: Vec<RefCell<TermFieldMatchData>>,
}

impl MatchData {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot for `handle`.
    ///
    /// # Panics
    /// If `handle` was not allocated by the layout this match data came from.
    pub fn resolve(&self, handle: TermFieldHandle) -> &RefCell<TermFieldMatchData> {
        match self.slots.get(handle as usize) {
            Some(slot) => slot,
            None => panic!("term field handle {} outside match data of {} slots", handle, self.slots.len()),
        }
    }

    /// Copy of the slot contents, for inspection after unpack.
    pub fn snapshot(&self, handle: TermFieldHandle) -> TermFieldMatchData {
        self.resolve(handle).borrow().clone()
    }
}

/// Hands out term-field handles while a plan is being built.
#[derive(Debug, Clone, Default)]
pub struct MatchDataLayout {
    fields: Vec<FieldId>,
}

impl MatchDataLayout {
    pub fn new() -> Self {
        MatchDataLayout::default()
    }

    pub fn alloc_term_field(&mut self, field_id: FieldId) -> TermFieldHandle {
        self.fields.push(field_id);
        (self.fields.len() - 1) as TermFieldHandle
    }

    pub fn num_term_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn create_match_data(&self) -> MatchData {
        MatchData {
            slots: self
                .fields
                .iter()
                .map(|&field_id| RefCell::new(TermFieldMatchData::new(field_id)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_allocates_sequential_handles() {
        let mut layout = MatchDataLayout::new();
        assert_eq!(layout.alloc_term_field(3), 0);
        assert_eq!(layout.alloc_term_field(7), 1);
        let md = layout.create_match_data();
        assert_eq!(md.len(), 2);
        assert_eq!(md.resolve(1).borrow().field_id, 7);
    }

    #[test]
    fn test_reset_clears_positions() {
        let mut tfmd = TermFieldMatchData::new(1);
        tfmd.reset(5);
        tfmd.append_position(2);
        assert!(tfmd.has_data(5));
        tfmd.reset(6);
        assert!(tfmd.positions.is_empty());
        assert!(!tfmd.has_data(5));
    }

    #[test]
    #[should_panic(expected = "outside match data")]
    fn test_resolve_unknown_handle_panics() {
        MatchDataLayout::new().create_match_data().resolve(0);
    }
}
