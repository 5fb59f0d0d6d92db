//! `segdl get` – pick the playlist or direct pipeline for a URL.

use anyhow::Result;
use segdl_core::config::SegdlConfig;
use segdl_core::fetcher::TransferOptions;
use segdl_core::probe::{is_dash, is_playlist, probe};

use super::{run_file, run_hls};

pub async fn run_get(cfg: &SegdlConfig, url: &str, name: Option<&str>) -> Result<()> {
    if is_dash(url, None) {
        anyhow::bail!("DASH manifests are not supported: {}", url);
    }
    if is_playlist(url, None) {
        return run_hls(cfg, url, name).await;
    }

    let opts = TransferOptions::from_config(cfg);
    let probe_url = url.to_string();
    let head = match tokio::task::spawn_blocking(move || probe(&probe_url, &opts)).await? {
        Ok(h) => Some(h),
        Err(e) => {
            tracing::warn!(url, "HEAD failed; treating as plain file: {:#}", e);
            None
        }
    };

    if is_dash(url, head.as_ref()) {
        anyhow::bail!("DASH manifests are not supported: {}", url);
    }
    if is_playlist(url, head.as_ref()) {
        tracing::info!(url, "content type is an HLS playlist");
        run_hls(cfg, url, name).await
    } else {
        run_file(cfg, url, name, head).await
    }
}
