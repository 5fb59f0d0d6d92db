//! Output naming: base names from URLs, extensions from content types, and
//! collision-free output paths.

mod path;
mod sanitize;

pub use path::{extension_from_url_path, last_path_segment, stem_from_url_path};
pub use sanitize::sanitize_base_name;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Base name when neither the caller nor the URL yields anything usable.
pub const DEFAULT_BASE_NAME: &str = "output";

/// Answers "does this name exist in that directory?" so collision handling can
/// be tested without touching the filesystem.
pub trait DirectoryListing {
    fn contains(&self, directory: &Path, file_name: &str) -> bool;
}

/// Looks at the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsListing;

impl DirectoryListing for FsListing {
    fn contains(&self, directory: &Path, file_name: &str) -> bool {
        directory.join(file_name).exists()
    }
}

/// A fixed set of names, regardless of directory.
impl DirectoryListing for HashSet<String> {
    fn contains(&self, _directory: &Path, file_name: &str) -> bool {
        HashSet::contains(self, file_name)
    }
}

/// `<stem>.<ext>`, or just `<stem>` when `ext` is empty.
pub fn file_name(stem: &str, ext: &str) -> String {
    if ext.is_empty() {
        stem.to_string()
    } else {
        format!("{}.{}", stem, ext)
    }
}

/// First free path among `<base>.<ext>`, `<base>_1.<ext>`, `<base>_2.<ext>`, ...
///
/// Never returns a path the listing reports as taken, so callers never overwrite.
pub fn next_available_name(
    listing: &dyn DirectoryListing,
    directory: &Path,
    base: &str,
    ext: &str,
) -> PathBuf {
    let mut candidate = file_name(base, ext);
    let mut counter = 1u64;
    while listing.contains(directory, &candidate) {
        candidate = file_name(&format!("{}_{}", base, counter), ext);
        counter += 1;
    }
    directory.join(candidate)
}

/// Output base name: explicit `name` if given, else the URL's last path
/// segment without extension, sanitized; falls back to `output`.
pub fn derive_base_name(url: &str, name: Option<&str>) -> String {
    let raw = match name {
        Some(n) if !n.trim().is_empty() => n.to_string(),
        _ => match stem_from_url_path(url) {
            Some(s) => s,
            None => return DEFAULT_BASE_NAME.to_string(),
        },
    };
    let sanitized = sanitize_base_name(&raw);
    if sanitized.is_empty() {
        DEFAULT_BASE_NAME.to_string()
    } else {
        sanitized
    }
}

/// Extension for a direct download: the URL's own extension, else a guess
/// from a `video/*` content type, else `bin`.
pub fn extension_for(url: &str, content_type: Option<&str>) -> String {
    if let Some(ext) = extension_from_url_path(url) {
        return ext;
    }
    let ct = content_type.unwrap_or("").to_ascii_lowercase();
    if ct.contains("video") {
        for (needle, ext) in [("mp4", "mp4"), ("mpeg", "mpeg"), ("webm", "webm"), ("ogg", "ogg"), ("mp2t", "ts")] {
            if ct.contains(needle) {
                return ext.to_string();
            }
        }
    }
    "bin".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn free_name_is_used_as_is() {
        let p = next_available_name(&listing(&[]), Path::new("/dl"), "movie", "mp4");
        assert_eq!(p, Path::new("/dl/movie.mp4"));
    }

    #[test]
    fn existing_name_gets_numeric_suffix() {
        let p = next_available_name(&listing(&["movie.mp4"]), Path::new("/dl"), "movie", "mp4");
        assert_eq!(p, Path::new("/dl/movie_1.mp4"));
    }

    #[test]
    fn suffix_skips_taken_numbers() {
        let taken = listing(&["movie.mp4", "movie_1.mp4", "movie_2.mp4", "movie_4.mp4"]);
        let p = next_available_name(&taken, Path::new("/dl"), "movie", "mp4");
        assert_eq!(p, Path::new("/dl/movie_3.mp4"));
    }

    #[test]
    fn empty_extension_has_no_dot() {
        let p = next_available_name(&listing(&["data"]), Path::new("d"), "data", "");
        assert_eq!(p, Path::new("d/data_1"));
    }

    #[test]
    fn fs_listing_sees_real_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("movie.mp4"), b"x").unwrap();
        let p = next_available_name(&FsListing, dir.path(), "movie", "mp4");
        assert_eq!(p, dir.path().join("movie_1.mp4"));
    }

    #[test]
    fn base_name_prefers_explicit_name() {
        assert_eq!(derive_base_name("https://x.test/a/show.m3u8", Some("Ep 1")), "Ep 1");
        assert_eq!(derive_base_name("https://x.test/a/show.m3u8", None), "show");
        assert_eq!(derive_base_name("https://x.test/", None), "output");
        assert_eq!(derive_base_name("https://x.test/a/show.m3u8", Some("  ")), "show");
        assert_eq!(derive_base_name("https://x.test/...", None), "output");
        assert_eq!(derive_base_name("https://x.test/My%20Movie.m3u8", None), "My Movie");
        assert_eq!(derive_base_name("https://x.test/a%2Fb.mp4", None), "a_b");
    }

    #[test]
    fn extension_guesses() {
        assert_eq!(extension_for("https://x.test/clip.webm", Some("video/mp4")), "webm");
        assert_eq!(extension_for("https://x.test/clip", Some("video/mp4")), "mp4");
        assert_eq!(extension_for("https://x.test/clip", Some("video/MP2T")), "ts");
        assert_eq!(extension_for("https://x.test/clip", Some("text/html")), "bin");
        assert_eq!(extension_for("https://x.test/clip", None), "bin");
    }
}
