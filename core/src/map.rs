use crate::config::validate_worker_count;
use crate::corpus::{Document, FieldValue};
use crate::error::{IndexError, Result};
use crate::pipeline::{run_unit, Phase};
use crate::tokenizer::TermExtractor;
use crate::KeyValue;
use rayon::prelude::*;
use std::ops::Range;

/// Emits one `(term, document_id)` pair per term occurrence in `chunk`.
pub fn map_chunk<D: Document>(
    chunk_index: usize,
    chunk: &[D],
    fields: &[String],
    extractor: &TermExtractor,
) -> Result<Vec<KeyValue>> {
    let mut keyvals = Vec::new();
    for doc in chunk {
        let document_id = doc.document_id();
        for field in fields {
            let text = match doc.field(field) {
                Some(FieldValue::Text(text)) => text,
                Some(_) => {
                    return Err(IndexError::NonTextField { document_id, field: field.clone(), chunk: chunk_index })
                }
                None => {
                    return Err(IndexError::MissingField { document_id, field: field.clone(), chunk: chunk_index })
                }
            };
            let canonical = extractor.canonicalize(text);
            keyvals.extend(extractor.terms(&canonical).map(|term| KeyValue { term, document_id }));
        }
    }
    tracing::debug!(chunk = chunk_index, docs = chunk.len(), pairs = keyvals.len(), "mapped chunk");
    Ok(keyvals)
}

/// Contiguous chunk ranges over `len` items: `min(len, mappers)` chunks whose
/// sizes differ by at most one, larger chunks first.
pub(crate) fn chunk_ranges(len: usize, mappers: usize) -> Vec<Range<usize>> {
    let chunks = len.min(mappers);
    if chunks == 0 {
        return Vec::new();
    }
    let (base, rem) = (len / chunks, len % chunks);
    let mut start = 0;
    (0..chunks)
        .map(|i| {
            let end = start + base + usize::from(i < rem);
            let range = start..end;
            start = end;
            range
        })
        .collect()
}

/// Splits `documents` into `min(len, mappers)` contiguous chunks and maps them
/// in parallel on the current rayon pool. Output is in chunk order.
///
/// The first failing chunk aborts the stage; chunks not yet started are
/// skipped.
pub fn map<D: Document>(
    documents: &[D],
    fields: &[String],
    extractor: &TermExtractor,
    mappers: usize,
) -> Result<Vec<Vec<KeyValue>>> {
    validate_worker_count("mapper", mappers)?;
    chunk_ranges(documents.len(), mappers)
        .into_par_iter()
        .enumerate()
        .map(|(i, range)| {
            let chunk = &documents[range];
            run_unit(Phase::Map, i, || map_chunk(i, chunk, fields, extractor))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::InMemoryDocument;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn docs() -> Vec<InMemoryDocument> {
        vec![
            InMemoryDocument::new(0, [("body", "this is a Test")]),
            InMemoryDocument::new(1, [("body", "test TEST pröve")]),
            InMemoryDocument::new(2, [("body", "")]),
        ]
    }

    #[test]
    fn emits_one_pair_per_occurrence() {
        let out = map_chunk(0, &docs()[1..2], &fields(&["body"]), &TermExtractor::default()).unwrap();
        let terms: Vec<&str> = out.iter().map(|kv| kv.term.as_str()).collect();
        assert_eq!(terms, vec!["test", "test", "prove"]);
        assert!(out.iter().all(|kv| kv.document_id == 1));
    }

    #[test]
    fn chunks_are_contiguous_and_bounded_by_mapper_count() {
        let docs = docs();
        let out = map(&docs, &fields(&["body"]), &TermExtractor::default(), 2).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].len(), 7);
        assert!(out[1].is_empty());

        let out = map(&docs, &fields(&["body"]), &TermExtractor::default(), 10).unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn one_chunk_per_mapper_when_documents_allow() {
        assert_eq!(chunk_ranges(5, 4), vec![0..2, 2..3, 3..4, 4..5]);
        assert_eq!(chunk_ranges(3, 10), vec![0..1, 1..2, 2..3]);
        assert_eq!(chunk_ranges(10, 3), vec![0..4, 4..7, 7..10]);
        assert!(chunk_ranges(0, 4).is_empty());

        let five: Vec<InMemoryDocument> = (0..5).map(|id| InMemoryDocument::new(id, [("body", "x")])).collect();
        let out = map(&five, &fields(&["body"]), &TermExtractor::default(), 4).unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(out.iter().map(Vec::len).collect::<Vec<_>>(), vec![2, 1, 1, 1]);
    }

    #[test]
    fn multiple_fields_are_all_indexed() {
        let doc = InMemoryDocument::new(5, [("title", "Rust"), ("body", "rust book")]);
        let out = map_chunk(0, &[doc], &fields(&["title", "body"]), &TermExtractor::default()).unwrap();
        assert_eq!(out, vec![KeyValue::new("rust", 5), KeyValue::new("rust", 5), KeyValue::new("book", 5)]);
    }

    #[test]
    fn missing_field_is_fatal() {
        let err = map(&docs(), &fields(&["body", "title"]), &TermExtractor::default(), 1).unwrap_err();
        assert!(matches!(err, IndexError::MissingField { document_id: 0, ref field, chunk: 0 } if field == "title"));
    }

    #[test]
    fn non_text_field_is_fatal() {
        let mut docs = docs();
        docs[2].fields.insert("body".into(), FieldValue::Number(1.0));
        let err = map(&docs, &fields(&["body"]), &TermExtractor::default(), 3).unwrap_err();
        assert!(matches!(err, IndexError::NonTextField { document_id: 2, chunk: 2, .. }));
    }

    #[test]
    fn zero_mappers_is_rejected() {
        let err = map(&docs(), &fields(&["body"]), &TermExtractor::default(), 0).unwrap_err();
        assert!(matches!(err, IndexError::InvalidWorkerCount { role: "mapper", .. }));
    }
}
