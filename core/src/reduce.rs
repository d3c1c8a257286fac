use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::pipeline::{run_unit, Phase};
use crate::{DocId, KeyValue, Posting};
use rayon::prelude::*;
use std::collections::HashMap;

/// Output of reducing one bucket. `posting_lists[id]` belongs to the term
/// with local id `id` in `dictionary`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReducedPart {
    pub posting_lists: Vec<Vec<Posting>>,
    pub dictionary: Dictionary,
}

impl ReducedPart {
    pub fn is_empty(&self) -> bool { self.dictionary.is_empty() }
}

/// Builds the local dictionary and posting lists for one bucket.
///
/// Postings for a term appear in order of the document's first occurrence in
/// the bucket; repeated occurrences bump `term_frequency`.
pub fn reduce(part: &[KeyValue]) -> ReducedPart {
    let mut dictionary = Dictionary::new();
    let mut posting_lists: Vec<Vec<Posting>> = Vec::new();
    // term id -> document id -> index into posting_lists[term id]
    let mut positions: Vec<HashMap<DocId, usize>> = Vec::new();

    for KeyValue { term, document_id } in part {
        let term_id = dictionary.add_if_absent(term) as usize;
        if posting_lists.len() <= term_id {
            posting_lists.resize_with(term_id + 1, Vec::new);
            positions.resize_with(term_id + 1, HashMap::new);
        }

        let postings = &mut posting_lists[term_id];
        let existing = positions[term_id].get(document_id).copied();
        match existing {
            Some(at) => postings[at].term_frequency += 1,
            None => {
                positions[term_id].insert(*document_id, postings.len());
                postings.push(Posting::new(*document_id, 1));
            }
        }
    }

    ReducedPart { posting_lists, dictionary }
}

/// Reduces every bucket in parallel on the current rayon pool. Results are
/// returned in bucket order.
pub fn reduce_all(parts: &[Vec<KeyValue>]) -> Result<Vec<ReducedPart>> {
    parts
        .par_iter()
        .enumerate()
        .map(|(i, part)| {
            run_unit(Phase::Reduce, i, || {
                let reduced = reduce(part);
                tracing::debug!(bucket = i, pairs = part.len(), terms = reduced.dictionary.len(), "reduced bucket");
                Ok(reduced)
            })
        })
        .collect()
}
