//! Fetch error type for retry classification.

use thiserror::Error;

/// Error returned by a fetch (curl failure, HTTP error, resume mismatch or
/// filesystem failure). Kept typed so the retry loop can classify it before
/// anything is converted to `anyhow`.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection reset, DNS, ...).
    #[error("network error")]
    Network(#[source] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    HttpStatus(u32),
    /// Server rejected a resume request; the temp file was reset to zero bytes.
    #[error("server rejected range request at offset {offset}")]
    RangeNotSupported { offset: u64 },
    /// Transfer completed but fewer bytes arrived than the server advertised
    /// (e.g. server closed early). Partial bytes stay on disk for the next attempt.
    #[error("partial transfer: expected {expected} bytes, got {received}")]
    PartialTransfer { expected: u64, received: u64 },
    /// Server sent more bytes than it advertised; the temp file was reset.
    #[error("server sent more than the advertised {expected} bytes")]
    Overrun { expected: u64 },
    /// Every allowed attempt failed with a retryable error.
    #[error("gave up after {attempts} attempt(s)")]
    ExhaustedRetries {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
    /// Disk/storage failure (disk full, permission denied). Not retried.
    #[error("filesystem error")]
    Filesystem(#[source] std::io::Error),
    /// The shared cancel flag was set before another attempt could start.
    #[error("cancelled")]
    Cancelled,
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        FetchError::Filesystem(e)
    }
}

impl FetchError {
    /// The error that actually ended the transfer, looking through `ExhaustedRetries`.
    pub fn root(&self) -> &FetchError {
        match self {
            FetchError::ExhaustedRetries { last, .. } => last.root(),
            other => other,
        }
    }
}
