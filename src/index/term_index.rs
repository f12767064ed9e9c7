//! In-memory index the query front end resolves terms against.

use std::collections::HashMap;
use std::sync::Arc;
use roaring::RoaringBitmap;
use crate::core::types::{DocId, FieldId, Term};
use crate::index::posting::PostingList;
use crate::index::source::{BitVectorSource, PostingSource};

/// Posting lists for text fields and bitmaps for attribute fields.
#[derive(Debug, Default)]
pub struct TermIndex {
    fields: Vec<String>,
    terms: HashMap<(FieldId, String), Arc<PostingSource>>,
    attributes: HashMap<(FieldId, String), Arc<BitVectorSource>>,
    docid_limit: u32,
}

impl TermIndex {
    pub fn builder() -> TermIndexBuilder {
        TermIndexBuilder::default()
    }

    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.fields.iter().position(|f| f == name).map(|i| i as FieldId)
    }

    pub fn term(&self, term: &Term) -> Option<Arc<PostingSource>> {
        let field_id = self.field_id(&term.field)?;
        self.terms.get(&(field_id, term.text.clone())).cloned()
    }

    pub fn attribute(&self, field: &str, value: &str) -> Option<Arc<BitVectorSource>> {
        let field_id = self.field_id(field)?;
        self.attributes.get(&(field_id, value.to_string())).cloned()
    }

    /// One past the largest doc id indexed.
    pub fn docid_limit(&self) -> u32 {
        self.docid_limit
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }
}

#[derive(Debug, Default)]
pub struct TermIndexBuilder {
    fields: Vec<String>,
    postings: HashMap<(FieldId, String), PostingList>,
    attributes: HashMap<(FieldId, String), RoaringBitmap>,
    max_doc: Option<DocId>,
}

impl TermIndexBuilder {
    fn intern_field(&mut self, name: &str) -> FieldId {
        match self.fields.iter().position(|f| f == name) {
            Some(i) => i as FieldId,
            None => {
                self.fields.push(name.to_string());
                (self.fields.len() - 1) as FieldId
            }
        }
    }

    fn touch(&mut self, doc_id: DocId) {
        self.max_doc = Some(self.max_doc.map_or(doc_id, |m| m.max(doc_id)));
    }

    /// Index `text` word by word, lowercased, with word positions.
    pub fn add_text(&mut self, doc_id: DocId, field: &str, text: &str) -> &mut Self {
        let field_id = self.intern_field(field);
        self.touch(doc_id);
        for (position, word) in text.split_whitespace().enumerate() {
            let word = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if word.is_empty() {
                continue;
            }
            self.postings
                .entry((field_id, word))
                .or_default()
                .add_occurrence(doc_id, position as u32);
        }
        self
    }

    pub fn add_attribute(&mut self, doc_id: DocId, field: &str, value: &str) -> &mut Self {
        let field_id = self.intern_field(field);
        self.touch(doc_id);
        self.attributes
            .entry((field_id, value.to_string()))
            .or_default()
            .insert(doc_id);
        self
    }

    pub fn build(self) -> TermIndex {
        let name = |fields: &[String], (field_id, text): &(FieldId, String)| {
            format!("{}:{}", fields[*field_id as usize], text)
        };
        let terms = self
            .postings
            .into_iter()
            .map(|(key, list)| {
                let source = PostingSource::new(name(&self.fields, &key), Arc::new(list));
                (key, Arc::new(source))
            })
            .collect();
        let attributes = self
            .attributes
            .into_iter()
            .map(|(key, bits)| {
                let source = BitVectorSource::new(name(&self.fields, &key), Arc::new(bits));
                (key, Arc::new(source))
            })
            .collect();
        TermIndex {
            fields: self.fields,
            terms,
            attributes,
            docid_limit: self.max_doc.map_or(0, |m| m + 1),
        }
    }
}
