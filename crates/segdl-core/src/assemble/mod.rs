//! Assembler: hand the ordered segment files to the muxer, then clean up.
//!
//! Deletion is strictly a post-success step. If the muxer fails, every
//! segment and the manifest stay on disk so assembly can be rerun without
//! downloading anything.

mod error;
mod manifest;
mod muxer;

pub use error::AssembleError;
pub use manifest::{render as render_manifest, write_manifest};
pub use muxer::{FfmpegMuxer, Muxer};

use std::fs;
use std::path::{Path, PathBuf};

use crate::naming::{next_available_name, DirectoryListing, FsListing};

/// Assembles segment files into one output through a `Muxer`.
pub struct Assembler {
    muxer: Box<dyn Muxer>,
    listing: Box<dyn DirectoryListing + Send + Sync>,
}

impl Assembler {
    pub fn new(muxer: Box<dyn Muxer>) -> Self {
        Self {
            muxer,
            listing: Box::new(FsListing),
        }
    }

    /// Replace the filesystem view used for output-name collision checks.
    pub fn with_listing(mut self, listing: Box<dyn DirectoryListing + Send + Sync>) -> Self {
        self.listing = listing;
        self
    }

    /// Mux `ordered_paths` into `output_path` (or the first free `<stem>_<n>.<ext>`
    /// next to it) and return the path actually written.
    pub fn assemble(&self, ordered_paths: &[PathBuf], output_path: &Path) -> Result<PathBuf, AssembleError> {
        if ordered_paths.is_empty() {
            return Err(AssembleError::NoSegments);
        }
        let directory = match output_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let base = output_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| crate::naming::DEFAULT_BASE_NAME.to_string());
        let ext = output_path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let output = next_available_name(self.listing.as_ref(), &directory, &base, &ext);
        if output != output_path {
            tracing::info!(requested = %output_path.display(), chosen = %output.display(), "output exists; using new name");
        }

        let manifest = directory.join(format!("{}_concat.txt", base));
        write_manifest(&manifest, ordered_paths).map_err(AssembleError::Filesystem)?;

        tracing::info!(segments = ordered_paths.len(), output = %output.display(), "merging segments");
        let code = self
            .muxer
            .mux(ordered_paths, &manifest, &output)
            .map_err(AssembleError::Spawn)?;
        if code != Some(0) {
            tracing::warn!(
                ?code,
                manifest = %manifest.display(),
                "muxer failed; keeping {} segment(s) for another attempt",
                ordered_paths.len()
            );
            return Err(AssembleError::Mux { code });
        }

        cleanup(ordered_paths, &manifest);
        tracing::info!(output = %output.display(), "assembly complete");
        Ok(output)
    }
}

/// Remove segments and manifest after a successful mux. Failures are logged only.
fn cleanup(ordered_paths: &[PathBuf], manifest: &Path) {
    for p in ordered_paths.iter().map(PathBuf::as_path).chain(std::iter::once(manifest)) {
        if let Err(e) = fs::remove_file(p) {
            tracing::warn!(path = %p.display(), "could not remove intermediate file: {}", e);
        }
    }
}
