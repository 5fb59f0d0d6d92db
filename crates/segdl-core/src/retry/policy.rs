use std::time::Duration;

/// High-level classification of an error for retry purposes.
///
/// Callers map HTTP status codes, curl errors, resume mismatches and IO
/// failures into these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Network-level failure (connection reset, DNS, etc.).
    Connection,
    /// Non-2xx HTTP status. Retried up to the attempt ceiling since some are
    /// transient server errors.
    HttpStatus(u16),
    /// Server ignored or rejected a resume; the next attempt starts from zero.
    RangeRestart,
    /// Body shorter or longer than advertised.
    Incomplete,
    /// Filesystem failure, cancellation or a malformed request. Never retried.
    Fatal,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff policy: after failed attempt `n` wait `backoff_base ^ n`
/// seconds (capped at `max_delay`), up to `max_attempts` attempts in total.
///
/// Built from `RetryConfig` and handed to the fetcher at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Backoff base in seconds.
    pub backoff_base: f64,
    /// Upper bound on a single backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_base: 2.0,
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.min(i32::MAX as u32) as i32;
        let secs = self.backoff_base.powi(exp);
        if !secs.is_finite() || secs >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        if secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(secs)
    }

    /// Decide whether to retry after attempt `attempt` (1-based) failed with `kind`.
    ///
    /// Returns `RetryDecision::NoRetry` when the attempt ceiling is reached or
    /// the error is fatal.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if kind == ErrorKind::Fatal || attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }

        match kind {
            // The temp file is already reset; nothing to wait for.
            ErrorKind::RangeRestart => RetryDecision::RetryAfter(Duration::ZERO),
            ErrorKind::Timeout
            | ErrorKind::Connection
            | ErrorKind::HttpStatus(_)
            | ErrorKind::Incomplete => RetryDecision::RetryAfter(self.backoff(attempt)),
            ErrorKind::Fatal => RetryDecision::NoRetry,
        }
    }
}
