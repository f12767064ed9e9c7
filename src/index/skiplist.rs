use crate::core::types::DocId;
use crate::index::posting::PostingList;

/// Sparse index over a posting list's doc ids, used to seek without
/// scanning every posting.
#[derive(Debug, Clone)]
pub struct SkipList {
    pub entries: Vec<SkipEntry>,
    pub doc_ids: Vec<DocId>,
    pub skip_interval: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct SkipEntry {
    pub doc_id: DocId,
    pub position: usize,  // Index into doc_ids
}

impl SkipList {
    pub fn build(posting_list: &PostingList) -> Self {
        let doc_ids = posting_list.doc_ids();
        let len = doc_ids.len();
        let interval = ((len as f32).sqrt() as usize).max(4);
        let entries = (0..len)
            .step_by(interval)
            .map(|i| SkipEntry { doc_id: doc_ids[i], position: i })
            .collect();
        SkipList {
            entries,
            doc_ids,
            skip_interval: interval,
        }
    }

    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    /// First index at or after `from` whose doc id is `>= target`, or
    /// `len()` if there is none.
    pub fn skip_to_ge(&self, target: DocId, from: usize) -> usize {
        let mut start = from;
        let first_entry = self.entries.partition_point(|e| e.position <= from);
        for entry in &self.entries[first_entry..] {
            if entry.doc_id > target {
                break;
            }
            start = entry.position;
        }
        for i in start..self.doc_ids.len() {
            if self.doc_ids[i] >= target {
                return i;
            }
        }
        self.doc_ids.len()
    }
}
