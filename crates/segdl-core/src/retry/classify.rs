//! Classify HTTP status, curl errors and fetch errors into retry kinds.

use super::error::FetchError;
use super::policy::ErrorKind;

/// Classify a non-2xx HTTP status code for retry decisions.
pub fn classify_http_status(code: u32) -> ErrorKind {
    ErrorKind::HttpStatus(code.min(u16::MAX as u32) as u16)
}

/// Classify a curl error for retry decisions.
///
/// Malformed URLs and unsupported schemes will fail identically on every
/// attempt, so they are fatal; everything else is treated as transient.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_url_malformed() || e.is_unsupported_protocol() {
        return ErrorKind::Fatal;
    }
    ErrorKind::Connection
}

/// Classify a fetch error into an ErrorKind.
pub fn classify(e: &FetchError) -> ErrorKind {
    match e {
        FetchError::Network(ce) => classify_curl_error(ce),
        FetchError::HttpStatus(code) => classify_http_status(*code),
        FetchError::RangeNotSupported { .. } => ErrorKind::RangeRestart,
        FetchError::PartialTransfer { .. } | FetchError::Overrun { .. } => ErrorKind::Incomplete,
        FetchError::ExhaustedRetries { .. } | FetchError::Filesystem(_) | FetchError::Cancelled => {
            ErrorKind::Fatal
        }
    }
}
