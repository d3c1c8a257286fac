//! Hash partitioning of map output into reducer buckets.
//!
//! Routing contract: a term goes to bucket `fnv1a_64(term) % reducers`, where
//! `fnv1a_64` is 64-bit FNV-1a over the term's UTF-8 bytes (offset basis
//! `0xcbf29ce484222325`, prime `0x100000001b3`). The hash is unsalted, so the
//! assignment is identical across runs, processes and machines.

use crate::config::validate_worker_count;
use crate::error::Result;
use crate::KeyValue;
use fnv::FnvHasher;
use std::hash::Hasher;

pub fn term_hash(term: &str) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(term.as_bytes());
    hasher.finish()
}

/// Bucket index for `term` out of `reducers` buckets. Callers validate
/// `reducers > 0` first.
pub(crate) fn partition_of(term: &str, reducers: usize) -> usize {
    (term_hash(term) % reducers as u64) as usize
}

/// Routes every pair into exactly one of `reducers` buckets. Within a bucket
/// pairs keep map order (chunk order, then emission order).
pub fn partition(keyvals_list: Vec<Vec<KeyValue>>, reducers: usize) -> Result<Vec<Vec<KeyValue>>> {
    validate_worker_count("reducer", reducers)?;
    let mut parts: Vec<Vec<KeyValue>> = (0..reducers).map(|_| Vec::new()).collect();
    for keyvals in keyvals_list {
        for kv in keyvals {
            let bucket = partition_of(&kv.term, reducers);
            parts[bucket].push(kv);
        }
    }
    tracing::debug!(
        reducers,
        sizes = ?parts.iter().map(Vec::len).collect::<Vec<_>>(),
        "partitioned pairs"
    );
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexError;
    use std::collections::HashSet;

    fn sample() -> Vec<Vec<KeyValue>> {
        vec![
            vec![KeyValue::new("this", 0), KeyValue::new("is", 0), KeyValue::new("a", 0), KeyValue::new("test", 0)],
            vec![KeyValue::new("test", 1), KeyValue::new("test", 1), KeyValue::new("prove", 1)],
        ]
    }

    #[test]
    fn fnv1a_reference_values() {
        assert_eq!(term_hash(""), 0xcbf29ce484222325);
        assert_eq!(term_hash("a"), 0xaf63dc4c8601ec8c);
        assert_eq!(term_hash("foobar"), 0x85944171f73967e8);
    }

    #[test]
    fn partition_is_deterministic() {
        let a = partition(sample(), 3).unwrap();
        let b = partition(sample(), 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn partition_is_exhaustive_and_term_disjoint() {
        let parts = partition(sample(), 4).unwrap();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts.iter().map(Vec::len).sum::<usize>(), 7);

        let mut seen: HashSet<&str> = HashSet::new();
        for (i, part) in parts.iter().enumerate() {
            let terms: HashSet<&str> = part.iter().map(|kv| kv.term.as_str()).collect();
            for term in &terms {
                assert_eq!(partition_of(term, 4), i);
                assert!(seen.insert(term), "term {term} in two buckets");
            }
        }
    }

    #[test]
    fn bucket_keeps_map_order() {
        let parts = partition(sample(), 1).unwrap();
        let flat: Vec<KeyValue> = sample().into_iter().flatten().collect();
        assert_eq!(parts, vec![flat]);
    }

    #[test]
    fn more_buckets_than_terms_leaves_empty_buckets() {
        let parts = partition(sample(), 64).unwrap();
        assert_eq!(parts.len(), 64);
        assert!(parts.iter().filter(|p| p.is_empty()).count() >= 64 - 5);
    }

    #[test]
    fn zero_reducers_is_rejected() {
        assert!(matches!(partition(sample(), 0), Err(IndexError::InvalidWorkerCount { role: "reducer", .. })));
    }
}
