//! Plain segment lists: one URL per line.

use anyhow::Result;
use url::Url;

use crate::segment::SegmentSpec;

/// Parse a list of segment URLs. Blank lines and `#` comments are skipped;
/// relative entries need `base`. Indices follow line order starting at 1.
pub fn parse_url_list(text: &str, base: Option<&Url>) -> Result<Vec<SegmentSpec>> {
    let urls = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| super::resolve(base, l))
        .collect::<Result<Vec<_>>>()?;
    super::number(urls)
}
