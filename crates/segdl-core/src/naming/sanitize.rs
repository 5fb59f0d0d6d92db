//! Filename sanitization for output names taken from URLs or the command line.

/// Maximum bytes kept from a base name, leaving room for `_<n>.<ext>` under NAME_MAX.
const MAX_BASE_LEN: usize = 200;

/// Makes `name` safe to use as a file stem.
///
/// Path separators, NUL and control characters become `_`, runs of `_` are
/// collapsed, leading/trailing dots, spaces and underscores are trimmed, and
/// the result is cut to a byte length that still fits a numeric suffix.
pub fn sanitize_base_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let c = if c == '/' || c == '\\' || c.is_control() { '_' } else { c };
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c: char| c == ' ' || c == '.' || c == '_');
    let mut take = trimmed.len().min(MAX_BASE_LEN);
    while !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}
