//! Bounded worker pool for segment jobs.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::progress::ProgressStats;
use crate::retry::FetchError;
use crate::segment::{SegmentJob, SegmentResult, SegmentSpec};

use super::error::JobError;

/// Runs `specs` on `worker_count` threads pulling from one shared queue.
///
/// Results arrive in completion order. The first terminal failure sets the
/// cancel flag and drains the unstarted queue; jobs already running finish
/// their current attempt and report `Cancelled`, which is not an error of its own.
pub(super) fn run_pool(
    job: &SegmentJob,
    specs: Vec<SegmentSpec>,
    directory: &Path,
    worker_count: usize,
    bytes_counter: &Arc<AtomicU64>,
    progress_tx: Option<&tokio::sync::mpsc::Sender<ProgressStats>>,
) -> Result<Vec<(u64, PathBuf)>, JobError> {
    let count = specs.len();
    let started = Instant::now();
    let work: Arc<Mutex<VecDeque<SegmentSpec>>> = Arc::new(Mutex::new(specs.into_iter().collect()));
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel::<SegmentResult>();
    let num_workers = worker_count.min(count);
    let mut handles = Vec::with_capacity(num_workers);
    for worker in 0..num_workers {
        let work = Arc::clone(&work);
        let tx = tx.clone();
        let cancel = Arc::clone(&cancel);
        let job = job.clone();
        let dir = directory.to_path_buf();
        handles.push(std::thread::spawn(move || loop {
            if cancel.load(Ordering::Relaxed) {
                break;
            }
            let next = match work.lock() {
                Ok(mut q) => q.pop_front(),
                Err(_) => None,
            };
            let Some(spec) = next else {
                break;
            };
            tracing::trace!(worker, index = spec.index(), "worker picked segment");
            if tx.send(job.run(&spec, &dir, &cancel)).is_err() {
                break;
            }
        }));
    }
    drop(tx);

    let mut completed: Vec<(u64, PathBuf)> = Vec::with_capacity(count);
    let mut first_error: Option<JobError> = None;
    let mut to_receive = count;
    while to_receive > 0 {
        let result = match rx.recv() {
            Ok(r) => r,
            Err(_) => {
                if first_error.is_none() {
                    first_error = Some(JobError::WorkerPanicked);
                }
                break;
            }
        };
        to_receive -= 1;
        match result.outcome {
            Ok(path) => {
                completed.push((result.index, path));
                if let Some(progress_tx) = progress_tx {
                    let _ = progress_tx.try_send(ProgressStats {
                        segments_done: completed.len(),
                        segment_count: count,
                        bytes_done: bytes_counter.load(Ordering::Relaxed),
                        elapsed_secs: started.elapsed().as_secs_f64(),
                    });
                }
            }
            Err(FetchError::Cancelled) => {
                tracing::debug!(index = result.index, "segment stopped by cancellation");
            }
            Err(e) => {
                if first_error.is_some() {
                    tracing::debug!(index = result.index, "further segment failure after abort: {}", e);
                    continue;
                }
                tracing::error!(index = result.index, "segment failed, aborting job: {}", e);
                cancel.store(true, Ordering::Relaxed);
                let drained = match work.lock() {
                    Ok(mut q) => {
                        let n = q.len();
                        q.clear();
                        n
                    }
                    Err(_) => 0,
                };
                to_receive = to_receive.saturating_sub(drained);
                first_error = Some(JobError::Segment {
                    index: result.index,
                    source: e,
                });
            }
        }
    }

    for h in handles {
        if h.join().is_err() && first_error.is_none() {
            first_error = Some(JobError::WorkerPanicked);
        }
    }
    if let Some(e) = first_error {
        return Err(e);
    }
    Ok(completed)
}
