use crate::error::{IndexError, Result};
use serde::Deserialize;

/// Settings for one MapReduce job.
///
/// Mapper and reducer counts are independent: `mappers` is the number of
/// document chunks, `reducers` the number of hash partitions. Worker pools are
/// capped at the machine's parallelism.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobConfig {
    pub fields: Vec<String>,
    pub mappers: usize,
    pub reducers: usize,
    pub verbose: bool,
}

impl Default for JobConfig {
    fn default() -> Self {
        let workers = default_workers();
        Self { fields: vec!["body".to_string()], mappers: workers, reducers: workers, verbose: false }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

impl JobConfig {
    pub fn new(fields: Vec<String>, mappers: usize, reducers: usize) -> Self {
        Self { fields, mappers, reducers, verbose: false }
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn validate(&self) -> Result<()> {
        validate_worker_count("mapper", self.mappers)?;
        validate_worker_count("reducer", self.reducers)
    }
}

pub(crate) fn validate_worker_count(role: &'static str, count: usize) -> Result<()> {
    if count == 0 {
        return Err(IndexError::InvalidWorkerCount { role, count });
    }
    Ok(())
}
