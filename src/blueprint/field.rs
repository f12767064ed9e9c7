use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::core::types::{FieldId, TermFieldHandle};

/// Binds a plan node to a field and to the match-data slot it fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field_id: FieldId,
    pub handle: TermFieldHandle,
    pub is_filter: bool,
}

impl FieldSpec {
    pub fn new(field_id: FieldId, handle: TermFieldHandle) -> Self {
        FieldSpec { field_id, handle, is_filter: false }
    }

    pub fn filter(field_id: FieldId, handle: TermFieldHandle) -> Self {
        FieldSpec { field_id, handle, is_filter: true }
    }
}

pub type FieldSpecList = Vec<FieldSpec>;

/// Merge the field lists of a disjunction's children.
///
/// Every child must expose fields and each field must map to the same handle
/// in every child that mentions it; otherwise nothing is exposed.
pub fn mix_children_fields<'a, I>(children: I) -> FieldSpecList
where
    I: IntoIterator<Item = &'a [FieldSpec]>,
{
    let mut mixed: BTreeMap<FieldId, FieldSpec> = BTreeMap::new();
    for fields in children {
        if fields.is_empty() {
            return FieldSpecList::new();
        }
        for field in fields {
            match mixed.get(&field.field_id) {
                Some(seen) if seen.handle != field.handle => return FieldSpecList::new(),
                Some(_) => {}
                None => {
                    mixed.insert(field.field_id, *field);
                }
            }
        }
    }
    mixed.into_values().collect()
}
