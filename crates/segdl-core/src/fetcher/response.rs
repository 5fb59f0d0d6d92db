//! Parse HTTP response header lines as libcurl hands them over.

/// Headers of the final response in a (possibly redirected) exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHead {
    /// Status code from the last `HTTP/x` status line.
    pub status: u32,
    /// `Content-Length`, i.e. the bytes in *this* body (remaining bytes for a 206).
    pub content_length: Option<u64>,
    /// First byte `a` of `Content-Range: bytes a-b/T`.
    pub content_range_start: Option<u64>,
    /// Complete size from `Content-Range: bytes a-b/T` or `bytes */T`.
    pub content_range_total: Option<u64>,
    /// True if server sent `Accept-Ranges: bytes`.
    pub accept_ranges: bool,
    /// `Content-Type` value if present.
    pub content_type: Option<String>,
}

impl ResponseHead {
    /// Feed one raw header line. A status line starts a fresh response, so
    /// headers of redirect hops never leak into the final one.
    pub fn push_line(&mut self, raw: &[u8]) {
        let Ok(line) = std::str::from_utf8(raw) else {
            return;
        };
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        if line.starts_with("HTTP/") {
            *self = ResponseHead {
                status: parse_status_line(line).unwrap_or(0),
                ..ResponseHead::default()
            };
            return;
        }
        let Some((name, value)) = line.split_once(':') else {
            return;
        };
        let name = name.trim();
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            self.content_length = value.parse::<u64>().ok();
        } else if name.eq_ignore_ascii_case("content-range") {
            self.content_range_start = parse_content_range_start(value);
            self.content_range_total = parse_content_range_total(value);
        } else if name.eq_ignore_ascii_case("accept-ranges") {
            self.accept_ranges = value.eq_ignore_ascii_case("bytes");
        } else if name.eq_ignore_ascii_case("content-type") {
            self.content_type = Some(value.to_string());
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn parse_status_line(line: &str) -> Option<u32> {
    line.split_whitespace().nth(1)?.parse().ok()
}

/// `bytes 100-199/1000` → 100, `bytes */1000` → None.
fn parse_content_range_start(value: &str) -> Option<u64> {
    let rest = value.strip_prefix("bytes")?.trim();
    let (range, _) = rest.split_once('/')?;
    let (start, _) = range.split_once('-')?;
    start.trim().parse().ok()
}

/// `bytes 100-199/1000` → 1000, `bytes */1000` → 1000, `bytes 0-9/*` → None.
fn parse_content_range_total(value: &str) -> Option<u64> {
    let rest = value.strip_prefix("bytes")?.trim();
    let (_, total) = rest.rsplit_once('/')?;
    total.trim().parse().ok()
}
