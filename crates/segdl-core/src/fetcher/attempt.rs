//! One HTTP GET attempt: optional `Range` resume, streamed append to the temp file.

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::retry::FetchError;
use crate::storage::PartFile;

use super::response::ResponseHead;
use super::TransferOptions;

/// Receives body chunks for one attempt and enforces the resume rules.
struct BodySink<'a> {
    part: &'a mut PartFile,
    /// Bytes on disk when the request was sent (the `Range` offset).
    offset: u64,
    /// Set on the first body decision (first chunk or end of an empty body).
    started: bool,
    /// Full size of the resource when the server advertised a length.
    expected_total: Option<u64>,
    error: Option<FetchError>,
    progress: Option<&'a AtomicU64>,
}

impl BodySink<'_> {
    /// Decide, once per response, whether to append, restart from zero or
    /// give up on this attempt.
    ///
    /// A `206` only continues the file when its `Content-Range` starts at
    /// the requested offset. A body starting at byte 0 (a `200`, or a `206`
    /// for the whole resource) replaces the temp file; any other start is a
    /// range the file cannot be stitched from.
    fn begin(&mut self, head: &ResponseHead) -> Result<(), FetchError> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        let start = if head.status == 206 {
            head.content_range_start
        } else {
            Some(0)
        };
        match start {
            Some(s) if s == self.offset => {}
            Some(0) => {
                tracing::warn!(
                    offset = self.offset,
                    status = head.status,
                    path = %self.part.temp_path().display(),
                    "server ignored range request; restarting from zero"
                );
                self.part.reset()?;
            }
            _ => {
                tracing::warn!(
                    offset = self.offset,
                    range_start = ?start,
                    path = %self.part.temp_path().display(),
                    "partial response does not start at the resume offset"
                );
                self.part.reset()?;
                return Err(FetchError::RangeNotSupported { offset: self.offset });
            }
        }
        let base = self.part.len();
        self.expected_total = match head.content_range_total {
            Some(total) if head.status == 206 => Some(total),
            _ => head.content_length.map(|n| n + base),
        };
        Ok(())
    }

    fn write(&mut self, head: &ResponseHead, data: &[u8]) -> Result<(), FetchError> {
        self.begin(head)?;
        if let Some(total) = self.expected_total {
            if self.part.len() + data.len() as u64 > total {
                self.part.reset()?;
                return Err(FetchError::Overrun { expected: total });
            }
        }
        self.part.append(data)?;
        if let Some(p) = self.progress {
            p.fetch_add(data.len() as u64, Ordering::Relaxed);
        }
        Ok(())
    }
}

/// Performs a single GET of `url` into `part`, resuming from `part.len()`.
///
/// Non-2xx bodies are discarded, never written. Returns `Ok` only when the
/// temp file holds the complete resource.
pub(super) fn fetch_once(
    url: &str,
    part: &mut PartFile,
    opts: &TransferOptions,
    progress: Option<&AtomicU64>,
) -> Result<(), FetchError> {
    let offset = part.len();
    let head = RefCell::new(ResponseHead::default());
    let mut sink = BodySink {
        part,
        offset,
        started: false,
        expected_total: None,
        error: None,
        progress,
    };

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(FetchError::Network)?;
    opts.apply(&mut easy).map_err(FetchError::Network)?;
    if offset > 0 {
        // curl expects "start-" here, not "bytes=start-"
        easy.range(&format!("{}-", offset))
            .map_err(FetchError::Network)?;
    }

    let perform_result = {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|line| {
                head.borrow_mut().push_line(line);
                true
            })
            .map_err(FetchError::Network)?;
        transfer
            .write_function(|data| {
                let head = head.borrow();
                if !head.is_success() {
                    return Ok(data.len());
                }
                match sink.write(&head, data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        sink.error = Some(e);
                        // Short count makes libcurl abort with a write error.
                        Ok(0)
                    }
                }
            })
            .map_err(FetchError::Network)?;
        transfer.perform()
    };

    if let Err(e) = perform_result {
        if e.is_write_error() {
            if let Some(err) = sink.error.take() {
                return Err(err);
            }
        }
        return Err(FetchError::Network(e));
    }

    let head = head.into_inner();
    let code = easy.response_code().map_err(FetchError::Network)?;
    if code == 416 && offset > 0 {
        if head.content_range_total == Some(offset) {
            tracing::debug!(offset, "temp file already holds the full resource");
            return Ok(());
        }
        sink.part.reset()?;
        return Err(FetchError::RangeNotSupported { offset });
    }
    if !(200..300).contains(&code) {
        return Err(FetchError::HttpStatus(code));
    }

    // Empty body: the restart decision still applies.
    sink.begin(&head)?;

    let received = sink.part.len();
    match sink.expected_total {
        Some(expected) if received > expected => {
            sink.part.reset()?;
            Err(FetchError::Overrun { expected })
        }
        Some(expected) if received < expected => Err(FetchError::PartialTransfer { expected, received }),
        _ => Ok(()),
    }
}
