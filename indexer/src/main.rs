use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use mrindex_core::{
    Corpus, EnglishStemmingNormalizer, InMemoryCorpus, InMemoryDocument, InvertedIndex, JobConfig, MapReducer,
    SimpleNormalizer, SimpleTokenizer, TermExtractor,
};
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build an in-memory inverted index with a parallel MapReduce job", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index JSON/JSONL documents from a file or directory
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// JSON job config; flags below override its values
        #[arg(long)]
        config: Option<String>,
        /// Comma-separated fields to index
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,
        /// Number of map workers
        #[arg(long)]
        mappers: Option<usize>,
        /// Number of partitions / reduce workers
        #[arg(long)]
        reducers: Option<usize>,
        /// Apply English stemming to terms
        #[arg(long, default_value_t = false)]
        stem: bool,
        /// Log phase boundaries
        #[arg(long, default_value_t = false)]
        verbose: bool,
        /// Print the posting list of a term (repeatable)
        #[arg(long)]
        show: Vec<String>,
        /// Print the whole index as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Index the built-in two document corpus and print the result
    Demo {
        #[arg(long, default_value_t = 2)]
        mappers: usize,
        #[arg(long, default_value_t = 2)]
        reducers: usize,
        #[arg(long, default_value_t = false)]
        verbose: bool,
    },
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Commands::Build { verbose, .. } | Commands::Demo { verbose, .. } => *verbose,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.command.verbose() { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Build { input, config, fields, mappers, reducers, stem, verbose, show, json } => {
            let mut cfg = match config {
                Some(path) => {
                    let text = fs::read_to_string(&path).with_context(|| format!("reading config {path}"))?;
                    JobConfig::from_json(&text).with_context(|| format!("parsing config {path}"))?
                }
                None => JobConfig::default(),
            };
            if let Some(fields) = fields { cfg.fields = fields; }
            if let Some(m) = mappers { cfg.mappers = m; }
            if let Some(r) = reducers { cfg.reducers = r; }
            cfg.verbose |= verbose;
            build_index(&input, &cfg, stem, &show, json)
        }
        Commands::Demo { mappers, reducers, verbose } => {
            let cfg = JobConfig { fields: vec!["body".into()], mappers, reducers, verbose };
            let index = run_job(&demo_corpus(), &cfg, TermExtractor::default())?;
            print_index(&index);
            Ok(())
        }
    }
}

fn demo_corpus() -> InMemoryCorpus {
    let mut corpus = InMemoryCorpus::new();
    corpus.add_document(InMemoryDocument::new(0, [("body", "this is a Test")]));
    corpus.add_document(InMemoryDocument::new(1, [("body", "test TEST pröve")]));
    corpus
}

fn run_job(corpus: &InMemoryCorpus, cfg: &JobConfig, extractor: TermExtractor) -> Result<InvertedIndex> {
    let start = Instant::now();
    let index = MapReducer::from_config(cfg, extractor)
        .run(corpus, cfg)
        .context("mapreduce job failed")?;
    tracing::info!(
        mappers = cfg.mappers,
        reducers = cfg.reducers,
        terms = index.num_terms(),
        took_s = start.elapsed().as_secs_f64(),
        "index built"
    );
    Ok(index)
}

fn build_index(input: &str, cfg: &JobConfig, stem: bool, show: &[String], json: bool) -> Result<()> {
    let files = collect_files(Path::new(input))?;
    if files.is_empty() {
        bail!("no .json or .jsonl files found under {input}");
    }
    let corpus = load_corpus(&files)?;
    tracing::info!(num_docs = corpus.documents().len(), files = files.len(), "loaded corpus");

    let extractor = if stem {
        TermExtractor::new(EnglishStemmingNormalizer, SimpleTokenizer)
    } else {
        TermExtractor::new(SimpleNormalizer, SimpleTokenizer)
    };
    let index = run_job(&corpus, cfg, extractor.clone())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&index)?);
        return Ok(());
    }
    println!("documents: {}", corpus.documents().len());
    println!("terms: {}", index.num_terms());
    for raw in show {
        for term in extractor.get_terms(raw) {
            match index.postings(&term) {
                Some(postings) => {
                    let list: Vec<String> = postings.iter().map(|p| format!("({}, {})", p.document_id, p.term_frequency)).collect();
                    println!("{term}: [{}]", list.join(", "));
                }
                None => println!("{term}: not found"),
            }
        }
    }
    Ok(())
}

fn print_index(index: &InvertedIndex) {
    for term in index.terms() {
        if let Some(postings) = index.postings(term) {
            let list: Vec<String> = postings.iter().map(|p| format!("({}, {})", p.document_id, p.term_frequency)).collect();
            println!("{term} -> [{}]", list.join(", "));
        }
    }
}

fn collect_files(input: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        bail!("input path {} does not exist", input.display());
    }
    Ok(files)
}

fn load_corpus(files: &[PathBuf]) -> Result<InMemoryCorpus> {
    let mut corpus = InMemoryCorpus::new();
    let mut seen = HashSet::new();
    for file in files {
        let values = if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(file)?
        } else {
            read_json(file)?
        };
        for value in values {
            let doc = parse_document(value).with_context(|| format!("in {}", file.display()))?;
            if !seen.insert(doc.id) {
                bail!("duplicate document id {} in {}", doc.id, file.display());
            }
            corpus.add_document(doc);
        }
    }
    Ok(corpus)
}

fn read_jsonl(file: &Path) -> Result<Vec<Value>> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    let mut values = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let value = serde_json::from_str(&line).with_context(|| format!("{}:{}", file.display(), lineno + 1))?;
        values.push(value);
    }
    Ok(values)
}

fn read_json(file: &Path) -> Result<Vec<Value>> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    let json: Value = serde_json::from_reader(reader).with_context(|| format!("parsing {}", file.display()))?;
    match json {
        Value::Array(arr) => Ok(arr),
        Value::Object(_) => Ok(vec![json]),
        _ => bail!("{} must hold an object or an array of objects", file.display()),
    }
}

/// `{"id": 3, "title": "...", "body": "..."}` -> document 3 with the
/// remaining keys as fields.
fn parse_document(value: Value) -> Result<InMemoryDocument> {
    let Value::Object(mut obj) = value else {
        bail!("document must be a JSON object");
    };
    let id = obj
        .remove("id")
        .ok_or_else(|| anyhow!("document has no `id`"))?;
    let id = id
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| anyhow!("document id {id} is not a 32-bit unsigned integer"))?;
    Ok(InMemoryDocument::new(id, obj))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrindex_core::{FieldValue, Posting};
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn parses_documents_with_integer_ids() {
        let doc = parse_document(json!({"id": 4, "body": "hello", "year": 2020})).unwrap();
        assert_eq!(doc.id, 4);
        assert_eq!(doc.fields["body"], FieldValue::Text("hello".into()));
        assert_eq!(doc.fields["year"], FieldValue::Number(2020.0));
        assert!(!doc.fields.contains_key("id"));

        assert!(parse_document(json!({"body": "no id"})).is_err());
        assert!(parse_document(json!({"id": "x"})).is_err());
        assert!(parse_document(json!([1, 2])).is_err());
    }

    #[test]
    fn loads_json_and_jsonl_from_a_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.json"), r#"[{"id": 0, "body": "this is a Test"}]"#).unwrap();
        fs::write(dir.path().join("b.jsonl"), "{\"id\": 1, \"body\": \"test TEST pröve\"}\n\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let files = collect_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        let corpus = load_corpus(&files).unwrap();
        assert_eq!(corpus.documents().len(), 2);

        let cfg = JobConfig::new(vec!["body".into()], 2, 3);
        let index = run_job(&corpus, &cfg, TermExtractor::default()).unwrap();
        assert_eq!(index.postings("test").unwrap(), &[Posting::new(0, 1), Posting::new(1, 2)]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dup.jsonl");
        fs::write(&path, "{\"id\": 1, \"body\": \"a\"}\n{\"id\": 1, \"body\": \"b\"}\n").unwrap();
        assert!(load_corpus(&[path]).is_err());
    }

    #[test]
    fn demo_corpus_matches_the_reference_index() {
        let cfg = JobConfig::new(vec!["body".into()], 1, 1);
        let index = run_job(&demo_corpus(), &cfg, TermExtractor::default()).unwrap();
        assert_eq!(index.num_terms(), 5);
        assert_eq!(index.postings("prove").unwrap(), &[Posting::new(1, 1)]);
    }
}
