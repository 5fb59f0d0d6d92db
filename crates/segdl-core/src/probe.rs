//! HTTP HEAD probing.
//!
//! Uses the curl crate (libcurl) to read response headers: the content type
//! decides between the playlist and direct-file pipelines and feeds the
//! extension guess for direct downloads.

use anyhow::{Context, Result};

use crate::fetcher::{ResponseHead, TransferOptions};
use crate::naming;

/// Content types HLS servers use for playlists.
const PLAYLIST_CONTENT_TYPES: [&str; 3] = [
    "application/vnd.apple.mpegurl",
    "application/x-mpegurl",
    "audio/mpegurl",
];

/// Content type of DASH manifests.
const DASH_CONTENT_TYPE: &str = "application/dash+xml";

/// Result of a HEAD request: headers used to pick a pipeline and a file name.
#[derive(Debug, Clone, Default)]
pub struct HeadResult {
    /// Total size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
    /// True if server sent `Accept-Ranges: bytes`.
    pub accept_ranges: bool,
    /// `Content-Type` value if present.
    pub content_type: Option<String>,
}

impl From<ResponseHead> for HeadResult {
    fn from(h: ResponseHead) -> Self {
        Self {
            content_length: h.content_length,
            accept_ranges: h.accept_ranges,
            content_type: h.content_type,
        }
    }
}

/// Performs a HEAD request and returns parsed metadata. Follows redirects.
/// Blocking; call from `spawn_blocking` if used from async code.
pub fn probe(url: &str, opts: &TransferOptions) -> Result<HeadResult> {
    let mut head = ResponseHead::default();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    opts.apply(&mut easy)?;
    easy.nobody(true)?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|line| {
            head.push_line(line);
            true
        })?;
        transfer.perform().context("HEAD request failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("HEAD {} returned HTTP {}", url, code);
    }
    Ok(head.into())
}

/// True for `.m3u8` URLs, or when a HEAD result reports an HLS content type.
pub fn is_playlist(url: &str, head: Option<&HeadResult>) -> bool {
    if naming::extension_from_url_path(url).as_deref() == Some("m3u8") {
        return true;
    }
    let Some(ct) = head.and_then(|h| h.content_type.as_deref()) else {
        return false;
    };
    let ct = ct.to_ascii_lowercase();
    PLAYLIST_CONTENT_TYPES.iter().any(|t| ct.starts_with(t))
}

/// True for `.mpd` URLs, or when a HEAD result reports a DASH manifest.
/// DASH is detected only so callers can refuse it.
pub fn is_dash(url: &str, head: Option<&HeadResult>) -> bool {
    if naming::extension_from_url_path(url).as_deref() == Some("mpd") {
        return true;
    }
    head.and_then(|h| h.content_type.as_deref())
        .is_some_and(|ct| ct.to_ascii_lowercase().contains(DASH_CONTENT_TYPE))
}
