use crate::DocId;
use serde_json::Value;
use std::collections::HashMap;

/// A field value as stored in the corpus. Only `Text` can be indexed.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Null,
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self { FieldValue::Text(s.to_string()) }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self { FieldValue::Text(s) }
}

impl From<Value> for FieldValue {
    /// Arrays and objects carry no indexable text and map to `Null`.
    fn from(v: Value) -> Self {
        match v {
            Value::String(s) => FieldValue::Text(s),
            Value::Number(n) => FieldValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::Bool(b) => FieldValue::Boolean(b),
            Value::Null | Value::Array(_) | Value::Object(_) => FieldValue::Null,
        }
    }
}

pub trait Document: Send + Sync {
    fn document_id(&self) -> DocId;
    fn field(&self, name: &str) -> Option<&FieldValue>;
}

/// Read-only, sliceable collection of documents. The map stage splits
/// `documents()` into contiguous chunks.
pub trait Corpus: Sync {
    type Doc: Document;

    fn documents(&self) -> &[Self::Doc];

    fn len(&self) -> usize { self.documents().len() }

    fn is_empty(&self) -> bool { self.documents().is_empty() }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InMemoryDocument {
    pub id: DocId,
    pub fields: HashMap<String, FieldValue>,
}

impl InMemoryDocument {
    pub fn new<K, V>(id: DocId, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Self { id, fields: fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

impl Document for InMemoryDocument {
    fn document_id(&self) -> DocId { self.id }

    fn field(&self, name: &str) -> Option<&FieldValue> { self.fields.get(name) }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCorpus {
    documents: Vec<InMemoryDocument>,
}

impl InMemoryCorpus {
    pub fn new() -> Self { Self::default() }

    pub fn add_document(&mut self, doc: InMemoryDocument) {
        self.documents.push(doc);
    }

    pub fn get_document(&self, id: DocId) -> Option<&InMemoryDocument> {
        self.documents.iter().find(|d| d.id == id)
    }
}

impl FromIterator<InMemoryDocument> for InMemoryCorpus {
    fn from_iter<I: IntoIterator<Item = InMemoryDocument>>(iter: I) -> Self {
        Self { documents: iter.into_iter().collect() }
    }
}

impl Corpus for InMemoryCorpus {
    type Doc = InMemoryDocument;

    fn documents(&self) -> &[InMemoryDocument] { &self.documents }
}

/// Plain slices are corpora too, which keeps tests and benches terse.
impl<D: Document> Corpus for [D] {
    type Doc = D;

    fn documents(&self) -> &[D] { self }
}

impl<D: Document> Corpus for Vec<D> {
    type Doc = D;

    fn documents(&self) -> &[D] { self }
}
