use serde::{Deserialize, Serialize};
use crate::core::types::DocId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub positions: Vec<u32>,  // Token positions, ascending
}

impl Posting {
    pub fn new(doc_id: DocId, positions: Vec<u32>) -> Self {
        Posting { doc_id, positions }
    }
}

/// Occurrences of one term in one field, sorted by doc_id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostingList {
    pub postings: Vec<Posting>,
}

impl PostingList {
    pub fn new() -> Self {
        PostingList::default()
    }

    pub fn add_posting(&mut self, posting: Posting) {
        match self.postings.binary_search_by_key(&posting.doc_id, |p| p.doc_id) {
            Ok(pos) => {
                self.postings[pos] = posting;
            }
            Err(pos) => {
                self.postings.insert(pos, posting);
            }
        }
    }

    /// Record one more occurrence of the term in `doc_id`.
    pub fn add_occurrence(&mut self, doc_id: DocId, position: u32) {
        match self.postings.binary_search_by_key(&doc_id, |p| p.doc_id) {
            Ok(pos) => {
                let positions = &mut self.postings[pos].positions;
                if let Err(at) = positions.binary_search(&position) {
                    positions.insert(at, position);
                }
            }
            Err(pos) => self.postings.insert(pos, Posting::new(doc_id, vec![position])),
        }
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn doc_freq(&self) -> u32 {
        self.postings.len() as u32
    }

    pub fn doc_ids(&self) -> Vec<DocId> {
        self.postings.iter().map(|p| p.doc_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postings_stay_sorted() {
        let mut list = PostingList::new();
        list.add_posting(Posting::new(9, vec![1]));
        list.add_posting(Posting::new(2, vec![0]));
        list.add_posting(Posting::new(5, vec![3]));
        assert_eq!(list.doc_ids(), vec![2, 5, 9]);

        list.add_posting(Posting::new(5, vec![4, 6]));
        assert_eq!(list.len(), 3);
        assert_eq!(list.postings[1].positions, vec![4, 6]);
    }

    #[test]
    fn test_add_occurrence_merges_positions() {
        let mut list = PostingList::new();
        list.add_occurrence(4, 7);
        list.add_occurrence(4, 2);
        list.add_occurrence(4, 7);
        list.add_occurrence(1, 0);
        assert_eq!(list.doc_freq(), 2);
        assert_eq!(list.postings[1].positions, vec![2, 7]);
    }
}
