use crate::combine::combine;
use crate::config::{validate_worker_count, JobConfig};
use crate::corpus::Corpus;
use crate::error::{IndexError, Result};
use crate::map::map;
use crate::partition::partition;
use crate::reduce::reduce_all;
use crate::tokenizer::TermExtractor;
use crate::InvertedIndex;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Map,
    Partition,
    Reduce,
    Combine,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Map => "map",
            Phase::Partition => "partition",
            Phase::Reduce => "reduce",
            Phase::Combine => "combine",
        };
        f.write_str(name)
    }
}

/// Receives phase boundary notifications. Has no effect on the result.
pub trait PhaseObserver: Send + Sync {
    fn phase_started(&self, _phase: Phase) {}
    fn phase_finished(&self, _phase: Phase, _elapsed: Duration) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PhaseObserver for NoopObserver {}

/// Logs phase boundaries at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PhaseObserver for TracingObserver {
    fn phase_started(&self, phase: Phase) {
        tracing::info!(%phase, "starting phase");
    }

    fn phase_finished(&self, phase: Phase, elapsed: Duration) {
        tracing::info!(%phase, took_s = elapsed.as_secs_f64(), "finished phase");
    }
}

/// Runs one unit of work, turning a panic into `IndexError::WorkerFailure`.
pub(crate) fn run_unit<T>(phase: Phase, unit: usize, f: impl FnOnce() -> Result<T>) -> Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(IndexError::from_panic(phase, unit, payload)),
    }
}

/// Threads for a phase pool: never more than the units of work or the
/// machine's parallelism, whatever count was requested.
pub(crate) fn pool_threads(requested: usize, units: usize) -> usize {
    let cores = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    requested.min(units).min(cores).max(1)
}

fn build_pool(phase: Phase, workers: usize) -> Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(move |i| format!("{phase}-worker-{i}"))
        .build()
        .map_err(|source| IndexError::ThreadPool { phase, source })
}

fn run_phase<T>(phase: Phase, observer: &dyn PhaseObserver, f: impl FnOnce() -> Result<T>) -> Result<T> {
    observer.phase_started(phase);
    let start = Instant::now();
    let out = f().map_err(|err| {
        tracing::error!(%phase, error = %err, "phase failed");
        err
    })?;
    observer.phase_finished(phase, start.elapsed());
    Ok(out)
}

/// Builds an inverted index with the four-phase Map → Partition → Reduce →
/// Combine pipeline.
///
/// Each phase finishes completely before the next one starts. Map and reduce
/// units run on separate bounded pools; no state is shared between units and
/// the only merge happens in the single-threaded combine phase.
#[derive(Clone)]
pub struct MapReducer {
    fields: Vec<String>,
    extractor: TermExtractor,
}

impl MapReducer {
    pub fn new(fields: Vec<String>, extractor: TermExtractor) -> Self {
        Self { fields, extractor }
    }

    pub fn from_config(config: &JobConfig, extractor: TermExtractor) -> Self {
        Self::new(config.fields.clone(), extractor)
    }

    pub fn fields(&self) -> &[String] { &self.fields }

    pub fn mapreduce<C: Corpus + ?Sized>(
        &self,
        corpus: &C,
        mappers: usize,
        reducers: usize,
        observer: &dyn PhaseObserver,
    ) -> Result<InvertedIndex> {
        validate_worker_count("mapper", mappers)?;
        validate_worker_count("reducer", reducers)?;
        let documents = corpus.documents();

        let map_pool = build_pool(Phase::Map, pool_threads(mappers, documents.len()))?;
        let keyvals_list = run_phase(Phase::Map, observer, || {
            map_pool.install(|| map(documents, &self.fields, &self.extractor, mappers))
        })?;
        drop(map_pool);

        let parts = run_phase(Phase::Partition, observer, || partition(keyvals_list, reducers))?;

        let reduce_pool = build_pool(Phase::Reduce, pool_threads(reducers, reducers))?;
        let reduced_parts = run_phase(Phase::Reduce, observer, || reduce_pool.install(|| reduce_all(&parts)))?;
        drop(reduce_pool);
        drop(parts);

        let index = run_phase(Phase::Combine, observer, || Ok(combine(reduced_parts)))?;
        tracing::debug!(docs = documents.len(), terms = index.num_terms(), "mapreduce complete");
        Ok(index)
    }

    /// Runs with the counts and observer chosen by `config`.
    pub fn run<C: Corpus + ?Sized>(&self, corpus: &C, config: &JobConfig) -> Result<InvertedIndex> {
        config.validate()?;
        if config.verbose {
            self.mapreduce(corpus, config.mappers, config.reducers, &TracingObserver)
        } else {
            self.mapreduce(corpus, config.mappers, config.reducers, &NoopObserver)
        }
    }
}

/// Indexes `fields` of `corpus` with the default normalizer and tokenizer.
/// `verbose` logs phase boundaries through `tracing`.
pub fn mapreduce<C: Corpus + ?Sized>(
    corpus: &C,
    fields: &[&str],
    mappers: usize,
    reducers: usize,
    verbose: bool,
) -> Result<InvertedIndex> {
    let config = JobConfig {
        fields: fields.iter().map(|f| f.to_string()).collect(),
        mappers,
        reducers,
        verbose,
    };
    MapReducer::from_config(&config, TermExtractor::default()).run(corpus, &config)
}
