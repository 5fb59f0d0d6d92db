//! Disk I/O and file lifecycle.
//!
//! Every transfer writes into a `.part` file next to its final path, appends
//! in arrival order, and becomes visible under the final name only through a
//! single atomic rename.

mod writer;

pub use writer::PartFile;

use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `segment_3.ts` → `segment_3.ts.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}
