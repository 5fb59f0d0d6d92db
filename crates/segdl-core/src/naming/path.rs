//! Base-name and extension hints from a URL path.

/// Last non-empty path segment of `url`, percent-decoded, if any.
///
/// A segment that does not decode to UTF-8 is returned as written.
pub fn last_path_segment(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()?;
    let segment = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment)
}

/// Last path segment with its extension removed (`movie.m3u8` → `movie`).
pub fn stem_from_url_path(url: &str) -> Option<String> {
    let segment = last_path_segment(url)?;
    let stem = match segment.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => segment.as_str(),
    };
    Some(stem.to_string())
}

/// Lower-cased extension of the last path segment (`/a/b.MP4?x=1` → `mp4`).
pub fn extension_from_url_path(url: &str) -> Option<String> {
    let segment = last_path_segment(url)?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
