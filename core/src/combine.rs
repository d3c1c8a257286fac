use crate::reduce::ReducedPart;
use crate::{InvertedIndex, TermId};

/// Merges reduced buckets, in the order given, into one index.
///
/// Each bucket's local ids are rebased by the number of posting lists already
/// merged, so `dictionary[term]` keeps indexing the term's posting list.
/// Buckets must be term-disjoint, which hash partitioning guarantees.
pub fn combine(reduced_parts: Vec<ReducedPart>) -> InvertedIndex {
    let mut index = InvertedIndex::new();
    for ReducedPart { posting_lists, dictionary } in reduced_parts {
        let offset = index.posting_lists.len() as TermId;
        for (term, local_id) in dictionary.iter() {
            let previous = index.dictionary.insert(term.to_string(), offset + local_id);
            debug_assert!(previous.is_none(), "term `{term}` found in two buckets");
        }
        index.posting_lists.extend(posting_lists);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduce::reduce;
    use crate::{KeyValue, Posting};

    #[test]
    fn rebases_local_ids_by_bucket_offset() {
        let first = reduce(&[KeyValue::new("a", 0), KeyValue::new("b", 0)]);
        let second = reduce(&[KeyValue::new("c", 1), KeyValue::new("c", 2), KeyValue::new("d", 2)]);
        let index = combine(vec![first, second]);

        assert_eq!(index.term_id("a"), Some(0));
        assert_eq!(index.term_id("b"), Some(1));
        assert_eq!(index.term_id("c"), Some(2));
        assert_eq!(index.term_id("d"), Some(3));
        assert_eq!(index.postings("c").unwrap(), &[Posting::new(1, 1), Posting::new(2, 1)]);
        assert_eq!(index.posting_lists.len(), 4);
    }

    #[test]
    fn empty_parts_contribute_nothing() {
        let index = combine(vec![ReducedPart::default(), reduce(&[KeyValue::new("x", 3)]), ReducedPart::default()]);
        assert_eq!(index.num_terms(), 1);
        assert_eq!(index.postings("x").unwrap(), &[Posting::new(3, 1)]);
        assert!(combine(Vec::new()).is_empty());
    }
}
