//! Concat manifest: one `file '<absolute path>'` line per segment, in order.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Quote a path for the concat demuxer: single-quoted, with `'` written as `'\''`.
fn quote(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', r"'\''"))
}

/// Render the manifest text for `ordered_paths` (already absolute).
pub fn render(ordered_paths: &[PathBuf]) -> String {
    let mut out = String::new();
    for p in ordered_paths {
        out.push_str("file ");
        out.push_str(&quote(p));
        out.push('\n');
    }
    out
}

/// Write the manifest for `ordered_paths` to `manifest_path`, resolving each
/// entry to an absolute path.
pub fn write_manifest(manifest_path: &Path, ordered_paths: &[PathBuf]) -> io::Result<()> {
    let absolute = ordered_paths
        .iter()
        .map(|p| std::path::absolute(p))
        .collect::<io::Result<Vec<_>>>()?;
    let mut f = fs::File::create(manifest_path)?;
    f.write_all(render(&absolute).as_bytes())?;
    f.sync_all()
}
