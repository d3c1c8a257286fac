use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::sync::Arc;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[\p{L}\p{M}\p{N}]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Text cleanup applied before and after tokenization.
pub trait Normalizer: Send + Sync {
    /// Buffer-level cleanup, applied once to the whole field.
    fn canonicalize(&self, buffer: &str) -> String;
    /// Per-token cleanup. An empty result drops the token.
    fn normalize(&self, token: &str) -> String;
}

/// Splits a canonical buffer into token strings, in source order.
pub trait Tokenizer: Send + Sync {
    fn strings<'t>(&self, buffer: &'t str) -> Box<dyn Iterator<Item = &'t str> + 't>;
}

/// NFKC on the buffer; lowercase plus diacritic stripping on tokens.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleNormalizer;

impl Normalizer for SimpleNormalizer {
    fn canonicalize(&self, buffer: &str) -> String {
        buffer.nfkc().collect()
    }

    fn normalize(&self, token: &str) -> String {
        token.nfkd().filter(|c| !is_combining_mark(*c)).collect::<String>().to_lowercase()
    }
}

/// `SimpleNormalizer` followed by Snowball English stemming.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishStemmingNormalizer;

impl Normalizer for EnglishStemmingNormalizer {
    fn canonicalize(&self, buffer: &str) -> String {
        SimpleNormalizer.canonicalize(buffer)
    }

    fn normalize(&self, token: &str) -> String {
        let folded = SimpleNormalizer.normalize(token);
        STEMMER.stem(&folded).into_owned()
    }
}

/// Runs of letters, marks and digits; everything else separates tokens.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleTokenizer;

impl Tokenizer for SimpleTokenizer {
    fn strings<'t>(&self, buffer: &'t str) -> Box<dyn Iterator<Item = &'t str> + 't> {
        Box::new(RE.find_iter(buffer).map(|m| m.as_str()))
    }
}

/// Turns raw field text into index terms: canonicalize, tokenize, normalize.
#[derive(Clone)]
pub struct TermExtractor {
    normalizer: Arc<dyn Normalizer>,
    tokenizer: Arc<dyn Tokenizer>,
}

impl Default for TermExtractor {
    fn default() -> Self { Self::new(SimpleNormalizer, SimpleTokenizer) }
}

impl TermExtractor {
    pub fn new(normalizer: impl Normalizer + 'static, tokenizer: impl Tokenizer + 'static) -> Self {
        Self { normalizer: Arc::new(normalizer), tokenizer: Arc::new(tokenizer) }
    }

    pub fn canonicalize(&self, buffer: &str) -> String {
        self.normalizer.canonicalize(buffer)
    }

    /// Lazily yields the terms of an already canonicalized buffer. One term
    /// per occurrence, in token order.
    pub fn terms<'t>(&'t self, canonical: &'t str) -> impl Iterator<Item = String> + 't {
        self.tokenizer
            .strings(canonical)
            .filter(|token| !token.is_empty())
            .map(move |token| self.normalizer.normalize(token))
            .filter(|term| !term.is_empty())
    }

    /// Canonicalizes `buffer` and collects its terms.
    pub fn get_terms(&self, buffer: &str) -> Vec<String> {
        let canonical = self.canonicalize(buffer);
        self.terms(&canonical).collect()
    }
}
