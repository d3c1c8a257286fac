//! Parallel MapReduce construction of an in-memory inverted index.
//!
//! Documents are mapped to `(term, document_id)` pairs, hash-partitioned by
//! term, reduced per bucket into local dictionaries and posting lists, then
//! combined into a single index with globally consistent term ids.

pub mod combine;
pub mod config;
pub mod corpus;
pub mod dictionary;
pub mod error;
pub mod index;
pub mod map;
pub mod partition;
pub mod pipeline;
pub mod reduce;
pub mod tokenizer;

pub use config::JobConfig;
pub use corpus::{Corpus, Document, FieldValue, InMemoryCorpus, InMemoryDocument};
pub use dictionary::Dictionary;
pub use error::{IndexError, Result};
pub use index::{DocId, InvertedIndex, KeyValue, Posting, TermId};
pub use pipeline::{mapreduce, MapReducer, NoopObserver, Phase, PhaseObserver, TracingObserver};
pub use tokenizer::{EnglishStemmingNormalizer, Normalizer, SimpleNormalizer, SimpleTokenizer, TermExtractor, Tokenizer};
