use crate::TermId;
use std::collections::HashMap;

/// Term dictionary with dense ids assigned in first-seen order, starting at 0.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Dictionary {
    ids: HashMap<String, TermId>,
    terms: Vec<String>, // id -> term
}

impl Dictionary {
    pub fn new() -> Self { Self::default() }

    /// Returns the id of `term`, assigning the next dense id if it is new.
    pub fn add_if_absent(&mut self, term: &str) -> TermId {
        if let Some(&id) = self.ids.get(term) {
            return id;
        }
        let id = self.terms.len() as TermId;
        self.ids.insert(term.to_string(), id);
        self.terms.push(term.to_string());
        id
    }

    pub fn get_term_id(&self, term: &str) -> Option<TermId> {
        self.ids.get(term).copied()
    }

    pub fn get_term(&self, id: TermId) -> Option<&str> {
        self.terms.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    /// `(term, id)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, TermId)> + '_ {
        self.terms.iter().enumerate().map(|(id, term)| (term.as_str(), id as TermId))
    }
}
