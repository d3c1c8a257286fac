use crate::pipeline::Phase;
use crate::DocId;

pub type Result<T> = std::result::Result<T, IndexError>;

/// Every variant aborts the whole job; no partial index is ever returned.
#[derive(thiserror::Error, Debug)]
pub enum IndexError {
    #[error("map chunk {chunk}: document {document_id} has no field `{field}`")]
    MissingField { document_id: DocId, field: String, chunk: usize },

    #[error("map chunk {chunk}: field `{field}` of document {document_id} is not text")]
    NonTextField { document_id: DocId, field: String, chunk: usize },

    #[error("{role} count must be at least 1, got {count}")]
    InvalidWorkerCount { role: &'static str, count: usize },

    #[error("{phase} unit {unit} failed: {reason}")]
    WorkerFailure { phase: Phase, unit: usize, reason: String },

    #[error("could not start the {phase} worker pool")]
    ThreadPool {
        phase: Phase,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },
}

impl IndexError {
    /// Builds a `WorkerFailure` from a caught panic payload.
    pub(crate) fn from_panic(phase: Phase, unit: usize, payload: Box<dyn std::any::Any + Send>) -> Self {
        let reason = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "worker panicked".to_string()
        };
        IndexError::WorkerFailure { phase, unit, reason }
    }
}
