use serde::{Deserialize, Serialize};

/// Local document id. Id 0 is reserved; iteration starts at [`BEGIN_ID`].
pub type DocId = u32;

/// Numeric id of an indexed field.
pub type FieldId = u32;

/// Slot index into a [`MatchData`](crate::search::match_data::MatchData).
pub type TermFieldHandle = u32;

pub const BEGIN_ID: DocId = 1;

/// Sentinel for "no source assigned" on a plan node.
pub const UNSET_SOURCE_ID: u32 = u32::MAX;

/// Sentinel for "no docid limit injected yet".
pub const UNSET_DOCID_LIMIT: u32 = 0;

/// A term bound to a field, as seen by the query front end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Term {
    pub field: String,
    pub text: String,
}

impl Term {
    pub fn new(field: &str, text: &str) -> Self {
        Term {
            field: field.to_string(),
            text: text.to_string(),
        }
    }
}
