//! Job-level errors surfaced by the orchestrator.

use thiserror::Error;

use crate::retry::FetchError;

#[derive(Debug, Error)]
pub enum JobError {
    /// First terminal segment failure observed; the job was cancelled.
    #[error("segment {index} failed")]
    Segment {
        index: u64,
        #[source]
        source: FetchError,
    },
    #[error("duplicate segment index {0}")]
    DuplicateIndex(u64),
    #[error("worker count must be at least 1")]
    InvalidWorkerCount,
    #[error("segment worker panicked")]
    WorkerPanicked,
    #[error("cannot prepare download directory")]
    Filesystem(#[source] std::io::Error),
}

impl JobError {
    /// Index of the failing segment, when the failure belongs to one.
    pub fn failed_index(&self) -> Option<u64> {
        match self {
            JobError::Segment { index, .. } | JobError::DuplicateIndex(index) => Some(*index),
            _ => None,
        }
    }
}
