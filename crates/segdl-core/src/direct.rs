//! Direct (non-segmented) file download on top of the retryable fetcher.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use crate::fetcher::Fetcher;
use crate::naming::{self, file_name, next_available_name, FsListing};
use crate::retry::FetchError;
use crate::source::SubtitleTrack;
use crate::storage;

/// Download `url` into `directory` as `<name>.<ext>`, or `<name>_<n>.<ext>` if taken.
///
/// The partial file is always `<name>.<ext>.part`, independent of the final
/// name chosen, so an interrupted download resumes on the next run.
pub fn download_file(
    fetcher: &Fetcher,
    url: &str,
    directory: &Path,
    name: &str,
    ext: &str,
    cancel: &AtomicBool,
) -> Result<PathBuf, FetchError> {
    std::fs::create_dir_all(directory)?;
    let temp = storage::temp_path(&directory.join(file_name(name, ext)));
    let final_path = next_available_name(&FsListing, directory, name, ext);

    tracing::info!(url, path = %final_path.display(), "downloading file");
    let bytes = fetcher.fetch_via(url, &temp, &final_path, cancel)?;
    tracing::info!(bytes, path = %final_path.display(), "saved file");
    Ok(final_path)
}

/// Save every subtitle track as `subtitle_<lang>.<ext>` in `directory`
/// (`sub<n>` when the language is unknown, `vtt` when the URL has no
/// extension). A failed track is logged and skipped; the saved paths are returned.
pub fn download_subtitles(
    fetcher: &Fetcher,
    tracks: &[SubtitleTrack],
    directory: &Path,
    cancel: &AtomicBool,
) -> Vec<PathBuf> {
    let mut saved = Vec::with_capacity(tracks.len());
    for (i, track) in tracks.iter().enumerate() {
        let lang = track
            .language
            .clone()
            .unwrap_or_else(|| format!("sub{}", i + 1));
        let name = naming::derive_base_name("", Some(&format!("subtitle_{}", lang)));
        let ext = naming::extension_from_url_path(track.url.as_str()).unwrap_or_else(|| "vtt".to_string());
        match download_file(fetcher, track.url.as_str(), directory, &name, &ext, cancel) {
            Ok(path) => saved.push(path),
            Err(e) => tracing::warn!(url = %track.url, lang, "subtitle download failed: {}", e),
        }
    }
    saved
}
