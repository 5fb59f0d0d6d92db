//! Retry loop: run a closure until success or policy says stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::classify;
use super::error::FetchError;
use super::policy::{ErrorKind, RetryDecision, RetryPolicy};

/// Granularity at which a backoff sleep re-checks the cancel flag.
const CANCEL_POLL: Duration = Duration::from_millis(100);

/// Runs `f` until it succeeds or the retry policy says to stop.
///
/// `f` receives the 1-based attempt number. The cancel flag is checked before
/// every attempt; an attempt already running is never interrupted. When a
/// retryable error hits the attempt ceiling the last error is wrapped in
/// `FetchError::ExhaustedRetries`; fatal errors are returned unchanged.
pub fn run_with_retry<T, F>(
    policy: &RetryPolicy,
    cancel: &AtomicBool,
    mut f: F,
) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Result<T, FetchError>,
{
    let mut attempt = 1u32;
    loop {
        if cancel.load(Ordering::Relaxed) {
            return Err(FetchError::Cancelled);
        }
        match f(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry if kind == ErrorKind::Fatal => return Err(e),
                    RetryDecision::NoRetry => {
                        return Err(FetchError::ExhaustedRetries {
                            attempts: attempt,
                            last: Box::new(e),
                        })
                    }
                    RetryDecision::RetryAfter(d) => {
                        tracing::warn!(attempt, delay_ms = d.as_millis() as u64, "attempt failed: {}", e);
                        sleep_unless_cancelled(d, cancel);
                        attempt += 1;
                    }
                }
            }
        }
    }
}

/// Sleeps for `d`, waking early if `cancel` is set.
pub fn sleep_unless_cancelled(d: Duration, cancel: &AtomicBool) {
    let deadline = Instant::now() + d;
    loop {
        if cancel.load(Ordering::Relaxed) {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        std::thread::sleep((deadline - now).min(CANCEL_POLL));
    }
}
