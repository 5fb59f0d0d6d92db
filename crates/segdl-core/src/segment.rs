//! Segment jobs: one `(index, URL)` pair turned into one finished file.
//!
//! File names depend only on the index, so re-running a job against the same
//! directory picks up the `.part` files of the previous run.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use thiserror::Error;
use url::Url;

use crate::fetcher::Fetcher;
use crate::naming;
use crate::retry::FetchError;
use crate::storage;

/// Rejected segment input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpecError {
    #[error("segment index must be at least 1")]
    ZeroIndex,
    #[error("segment {index}: not an absolute URL: {url}")]
    NotAbsolute { index: u64, url: String },
}

/// One segment to download. Immutable once created; `index` defines the
/// position in the assembled output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentSpec {
    index: u64,
    url: Url,
}

impl SegmentSpec {
    pub fn new(index: u64, url: &str) -> Result<Self, SpecError> {
        if index == 0 {
            return Err(SpecError::ZeroIndex);
        }
        let url = Url::parse(url).map_err(|_| SpecError::NotAbsolute {
            index,
            url: url.to_string(),
        })?;
        Ok(Self { index, url })
    }

    pub fn from_url(index: u64, url: Url) -> Result<Self, SpecError> {
        if index == 0 {
            return Err(SpecError::ZeroIndex);
        }
        Ok(Self { index, url })
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Outcome of one segment job, produced exactly once per `SegmentSpec`.
#[derive(Debug)]
pub struct SegmentResult {
    pub index: u64,
    pub outcome: Result<PathBuf, FetchError>,
}

/// `segment_<index>.<ext>` (no dot when `ext` is empty).
pub fn segment_file_name(index: u64, extension: &str) -> String {
    naming::file_name(&format!("segment_{}", index), extension)
}

/// Drives the shared `Fetcher` for single segments. Cheap to clone into workers.
#[derive(Debug, Clone)]
pub struct SegmentJob {
    fetcher: Arc<Fetcher>,
    extension: String,
}

impl SegmentJob {
    pub fn new(fetcher: Arc<Fetcher>, extension: impl Into<String>) -> Self {
        Self {
            fetcher,
            extension: extension.into(),
        }
    }

    /// Final path of `index` inside `directory`.
    pub fn final_path(&self, directory: &Path, index: u64) -> PathBuf {
        directory.join(segment_file_name(index, &self.extension))
    }

    /// Download one segment into `directory`.
    ///
    /// A final file left by an earlier run is reused without any request.
    /// Whatever the fetcher returns is terminal for this segment; retries
    /// happen inside the fetcher only.
    pub fn run(&self, spec: &SegmentSpec, directory: &Path, cancel: &AtomicBool) -> SegmentResult {
        let index = spec.index();
        let path = self.final_path(directory, index);
        if path.is_file() && !storage::temp_path(&path).exists() {
            tracing::debug!(index, path = %path.display(), "segment already complete");
            return SegmentResult {
                index,
                outcome: Ok(path),
            };
        }

        tracing::debug!(index, url = %spec.url(), "segment started");
        let outcome = self
            .fetcher
            .fetch(spec.url().as_str(), &path, cancel)
            .map(|bytes| {
                tracing::debug!(index, bytes, "segment finished");
                path
            });
        SegmentResult { index, outcome }
    }
}
