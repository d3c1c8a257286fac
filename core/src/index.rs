use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type TermId = u32;
pub type DocId = u32;

/// One `(term, document)` occurrence emitted by the map stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyValue {
    pub term: String,
    pub document_id: DocId,
}

impl KeyValue {
    pub fn new(term: impl Into<String>, document_id: DocId) -> Self {
        Self { term: term.into(), document_id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub document_id: DocId,
    pub term_frequency: u32, // raw occurrences across the indexed fields
}

impl Posting {
    pub fn new(document_id: DocId, term_frequency: u32) -> Self {
        Self { document_id, term_frequency }
    }
}

/// The combined result of a MapReduce job.
///
/// `dictionary[term]` is the global term id, which indexes `posting_lists`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub posting_lists: Vec<Vec<Posting>>,
    pub dictionary: HashMap<String, TermId>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn term_id(&self, term: &str) -> Option<TermId> {
        self.dictionary.get(term).copied()
    }

    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        let id = self.term_id(term)?;
        self.posting_lists.get(id as usize).map(Vec::as_slice)
    }

    pub fn num_terms(&self) -> usize { self.dictionary.len() }

    pub fn is_empty(&self) -> bool { self.dictionary.is_empty() }

    /// Terms in ascending global id order.
    pub fn terms(&self) -> Vec<&str> {
        let mut terms: Vec<(&str, TermId)> = self.dictionary.iter().map(|(t, &id)| (t.as_str(), id)).collect();
        terms.sort_by_key(|&(_, id)| id);
        terms.into_iter().map(|(t, _)| t).collect()
    }

    pub fn into_parts(self) -> (Vec<Vec<Posting>>, HashMap<String, TermId>) {
        (self.posting_lists, self.dictionary)
    }
}
