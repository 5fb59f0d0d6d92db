//! Parallel orchestrator: bounded fan-out of segment jobs, fail-fast,
//! index-ordered fan-in.

mod error;
mod pool;

pub use error::JobError;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use crate::fetcher::Fetcher;
use crate::progress::ProgressStats;
use crate::segment::{SegmentJob, SegmentSpec};

/// Terminal value of a segmented job: every path in index order, or the first failure.
pub type JobOutcome = Result<Vec<PathBuf>, JobError>;

/// Downloads a list of segments with at most `worker_count` in flight.
pub struct Orchestrator {
    job: SegmentJob,
    worker_count: usize,
    bytes_counter: Arc<AtomicU64>,
    progress_tx: Option<tokio::sync::mpsc::Sender<ProgressStats>>,
}

impl Orchestrator {
    /// `segment_extension` names the files (`segment_<index>.<ext>`); `worker_count` must be ≥ 1.
    pub fn new(fetcher: Fetcher, segment_extension: &str, worker_count: usize) -> Result<Self, JobError> {
        if worker_count == 0 {
            return Err(JobError::InvalidWorkerCount);
        }
        let bytes_counter = Arc::new(AtomicU64::new(0));
        let fetcher = Arc::new(fetcher.with_bytes_counter(Arc::clone(&bytes_counter)));
        Ok(Self {
            job: SegmentJob::new(fetcher, segment_extension),
            worker_count,
            bytes_counter,
            progress_tx: None,
        })
    }

    /// Send a `ProgressStats` snapshot after every finished segment. Uses
    /// `try_send`, so a slow consumer drops snapshots instead of stalling workers.
    pub fn with_progress(mut self, tx: tokio::sync::mpsc::Sender<ProgressStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Download every spec into `directory` and return the local paths sorted by index.
    ///
    /// Duplicate indices are rejected before any request is made. On failure
    /// no path list is returned; files already downloaded stay on disk so a
    /// rerun resumes.
    pub fn run(&self, specs: &[SegmentSpec], directory: &Path) -> JobOutcome {
        let mut seen = HashSet::with_capacity(specs.len());
        for spec in specs {
            if !seen.insert(spec.index()) {
                return Err(JobError::DuplicateIndex(spec.index()));
            }
        }
        if specs.is_empty() {
            return Ok(Vec::new());
        }
        std::fs::create_dir_all(directory).map_err(JobError::Filesystem)?;

        tracing::info!(
            segments = specs.len(),
            workers = self.worker_count,
            dir = %directory.display(),
            "starting segmented download"
        );
        let mut completed = pool::run_pool(
            &self.job,
            specs.to_vec(),
            directory,
            self.worker_count,
            &self.bytes_counter,
            self.progress_tx.as_ref(),
        )?;
        completed.sort_by_key(|(index, _)| *index);
        tracing::info!(segments = completed.len(), "all segments downloaded");
        Ok(completed.into_iter().map(|(_, path)| path).collect())
    }
}
