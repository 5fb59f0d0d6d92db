//! Segment sources: turn a URL list or an HLS playlist into `SegmentSpec`s.
//!
//! Only the minimum needed to feed the engine: URIs are resolved against the
//! playlist URL and numbered in order. Playlist syntax is not validated.

mod list;
mod playlist;

pub use list::parse_url_list;
pub use playlist::{parse_media_playlist, PlaylistKind, SubtitleTrack, Variant};

use anyhow::{Context, Result};
use url::Url;

use crate::fetcher::TransferOptions;
use crate::segment::SegmentSpec;

/// Resolve `reference` against `base` (absolute references pass through).
pub(crate) fn resolve(base: Option<&Url>, reference: &str) -> Result<Url> {
    match base {
        Some(b) => b
            .join(reference)
            .with_context(|| format!("cannot resolve {} against {}", reference, b)),
        None => Url::parse(reference).with_context(|| format!("not an absolute URL: {}", reference)),
    }
}

/// Number resolved URLs 1..=n in order.
pub(crate) fn number(urls: Vec<Url>) -> Result<Vec<SegmentSpec>> {
    urls.into_iter()
        .zip(1u64..)
        .map(|(url, index)| SegmentSpec::from_url(index, url).map_err(anyhow::Error::from))
        .collect()
}

/// GET `url` into memory (playlists are small). Blocking.
pub fn fetch_text(url: &str, opts: &TransferOptions) -> Result<String> {
    let mut body = Vec::new();
    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    opts.apply(&mut easy)?;
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform().with_context(|| format!("GET {} failed", url))?;
    }
    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("GET {} returned HTTP {}", url, code);
    }
    String::from_utf8(body).with_context(|| format!("{} is not UTF-8 text", url))
}
