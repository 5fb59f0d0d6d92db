//! `segdl hls` – download and merge an HLS playlist.

use anyhow::{Context, Result};
use segdl_core::config::SegdlConfig;
use segdl_core::direct::download_subtitles;
use segdl_core::fetcher::{Fetcher, TransferOptions};
use segdl_core::naming;
use segdl_core::segment::SegmentSpec;
use segdl_core::source::{fetch_text, parse_media_playlist, PlaylistKind, SubtitleTrack};
use std::sync::atomic::AtomicBool;
use url::Url;

use super::pipeline::run_segments;

/// Load the media playlist behind `url`, following the best variant of a
/// master playlist. Subtitle tracks come from the master playlist, if any.
fn load_segments(url: &str, opts: &TransferOptions) -> Result<(Vec<SegmentSpec>, Vec<SubtitleTrack>)> {
    let mut playlist_url = Url::parse(url).with_context(|| format!("invalid URL: {}", url))?;
    let text = fetch_text(playlist_url.as_str(), opts)?;
    let mut playlist = parse_media_playlist(&text, &playlist_url)?;
    let subtitles = playlist.subtitles().to_vec();

    if let Some(variant) = playlist.best_variant().cloned() {
        tracing::info!(
            bandwidth = variant.bandwidth,
            resolution = variant.resolution.as_deref().unwrap_or("-"),
            url = %variant.url,
            "selected variant"
        );
        println!(
            "Variant: {} bps {}",
            variant.bandwidth,
            variant.resolution.as_deref().unwrap_or("")
        );
        playlist_url = variant.url;
        let text = fetch_text(playlist_url.as_str(), opts)?;
        playlist = parse_media_playlist(&text, &playlist_url)?;
    }

    match playlist {
        PlaylistKind::Media(specs) if !specs.is_empty() => Ok((specs, subtitles)),
        PlaylistKind::Media(_) => anyhow::bail!("playlist {} has no segments", playlist_url),
        PlaylistKind::Master { .. } => anyhow::bail!("{} has no playable variant", playlist_url),
    }
}

pub async fn run_hls(cfg: &SegdlConfig, url: &str, name: Option<&str>) -> Result<()> {
    let opts = TransferOptions::from_config(cfg);
    let playlist_url = url.to_string();
    let (specs, subtitles) = tokio::task::spawn_blocking(move || load_segments(&playlist_url, &opts))
        .await
        .context("fetch")?
        .context("fetch")?;

    if subtitles.is_empty() {
        tracing::debug!(url, "no subtitle tracks");
    } else {
        println!("Downloading {} subtitle track(s)", subtitles.len());
        let fetcher = Fetcher::new(cfg.retry_policy(), TransferOptions::from_config(cfg));
        let directory = cfg.download_dir.clone();
        let saved = tokio::task::spawn_blocking(move || {
            download_subtitles(&fetcher, &subtitles, &directory, &AtomicBool::new(false))
        })
        .await?;
        for path in saved {
            println!("  subtitle saved as {}", path.display());
        }
    }

    let base_name = naming::derive_base_name(url, name);
    run_segments(cfg, specs, &base_name).await?;
    Ok(())
}
