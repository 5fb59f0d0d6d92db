//! Retry and backoff policy.
//!
//! This module encapsulates error classification (timeouts, HTTP status,
//! resume restarts, filesystem failures) and exponential backoff decisions so
//! that the fetcher and the orchestrator share one consistent policy.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::{run_with_retry, sleep_unless_cancelled};
