//! Progress reporting for segmented jobs (segments done, bytes, rate).
//!
//! The orchestrator sends a snapshot after each finished segment; consumers
//! compute rate = bytes_done / elapsed_secs and decide how to render it.

/// Snapshot of one job's progress (CLI-friendly).
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressStats {
    /// Segments finished (including ones already complete on disk).
    pub segments_done: usize,
    /// Total number of segments in the job.
    pub segment_count: usize,
    /// Body bytes received so far in this run.
    pub bytes_done: u64,
    /// Elapsed time since the job started (seconds).
    pub elapsed_secs: f64,
}

impl ProgressStats {
    /// Download rate in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done as f64 / self.elapsed_secs
    }

    /// Fraction of segments complete in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.segment_count == 0 {
            return 1.0;
        }
        (self.segments_done as f64 / self.segment_count as f64).min(1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.segments_done >= self.segment_count
    }
}
