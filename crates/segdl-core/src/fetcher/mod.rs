//! Retryable fetcher: one resource, one temp file, many attempts.
//!
//! Each attempt is a plain GET that resumes from the bytes already in the
//! `.part` file. Failed attempts leave their bytes on disk and back off per
//! the `RetryPolicy`; success fsyncs and renames the temp file into place.

mod attempt;
mod response;

pub use response::ResponseHead;

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;
use std::time::Duration;

use crate::config::SegdlConfig;
use crate::retry::{run_with_retry, FetchError, RetryPolicy};
use crate::storage::{self, PartFile};

/// libcurl settings applied to every request the crate makes.
#[derive(Debug, Clone)]
pub struct TransferOptions {
    pub user_agent: String,
    pub connect_timeout: Duration,
    /// Abort an attempt when no byte arrives for this long.
    pub read_timeout: Duration,
    /// Receive buffer size; body chunks are written to disk at most this large.
    pub chunk_size: usize,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0".to_string(),
            connect_timeout: Duration::from_secs(15),
            read_timeout: Duration::from_secs(15),
            chunk_size: 64 * 1024,
        }
    }
}

impl TransferOptions {
    pub fn from_config(cfg: &SegdlConfig) -> Self {
        Self {
            user_agent: cfg.user_agent.clone(),
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            read_timeout: Duration::from_secs(cfg.read_timeout_secs),
            chunk_size: cfg.chunk_size,
        }
    }

    /// Apply these options to a fresh easy handle.
    pub fn apply(&self, easy: &mut curl::easy::Easy) -> Result<(), curl::Error> {
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.useragent(&self.user_agent)?;
        easy.connect_timeout(self.connect_timeout)?;
        // Read timeout: fewer than 1 byte/s for `read_timeout` aborts the attempt.
        easy.low_speed_limit(1)?;
        easy.low_speed_time(self.read_timeout)?;
        easy.buffer_size(self.chunk_size)?;
        Ok(())
    }
}

/// Transient per-fetch bookkeeping; lives only as long as one `fetch` call.
#[derive(Debug, Default)]
struct TransferState {
    bytes_on_disk: u64,
    attempt: u32,
    last_error: Option<String>,
}

/// Downloads single resources with resume, retry and atomic placement.
///
/// Shared by all segment jobs of a run (`Arc<Fetcher>`); it holds no
/// per-transfer state.
#[derive(Debug)]
pub struct Fetcher {
    policy: RetryPolicy,
    options: TransferOptions,
    bytes_counter: Option<Arc<AtomicU64>>,
}

impl Fetcher {
    pub fn new(policy: RetryPolicy, options: TransferOptions) -> Self {
        Self {
            policy,
            options,
            bytes_counter: None,
        }
    }

    /// Count every body byte written by this fetcher into `counter`.
    pub fn with_bytes_counter(mut self, counter: Arc<AtomicU64>) -> Self {
        self.bytes_counter = Some(counter);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn options(&self) -> &TransferOptions {
        &self.options
    }

    /// Fetch `url` to `destination`, staging in `<destination>.part`.
    /// Returns the size of the finished file.
    pub fn fetch(&self, url: &str, destination: &Path, cancel: &AtomicBool) -> Result<u64, FetchError> {
        self.fetch_via(url, &storage::temp_path(destination), destination, cancel)
    }

    /// Like `fetch` but with an explicit temp path, for callers whose final
    /// name is chosen per run while the partial file must stay stable across runs.
    pub fn fetch_via(
        &self,
        url: &str,
        temp: &Path,
        destination: &Path,
        cancel: &AtomicBool,
    ) -> Result<u64, FetchError> {
        let mut part = PartFile::open(temp)?;
        let mut state = TransferState {
            bytes_on_disk: part.len(),
            ..TransferState::default()
        };
        if state.bytes_on_disk > 0 {
            tracing::debug!(url, resume_from = state.bytes_on_disk, "resuming partial file");
        }

        let result = run_with_retry(&self.policy, cancel, |attempt| {
            state.attempt = attempt;
            state.bytes_on_disk = part.len();
            let res = attempt::fetch_once(url, &mut part, &self.options, self.bytes_counter.as_deref());
            if let Err(e) = &res {
                state.last_error = Some(e.to_string());
            }
            res
        });
        if let Err(e) = result {
            tracing::debug!(
                url,
                attempts = state.attempt,
                last_attempt_offset = state.bytes_on_disk,
                bytes_on_disk = part.len(),
                last_error = state.last_error.as_deref().unwrap_or("-"),
                "fetch failed; keeping partial file: {}",
                e
            );
            return Err(e);
        }

        part.sync()?;
        let bytes = part.len();
        part.finalize(destination)?;
        tracing::debug!(url, bytes, attempts = state.attempt, path = %destination.display(), "fetch complete");
        Ok(bytes)
    }
}
