//! `segdl file` – download one file without segmenting.

use anyhow::{Context, Result};
use segdl_core::config::SegdlConfig;
use segdl_core::direct::download_file;
use segdl_core::fetcher::{Fetcher, TransferOptions};
use segdl_core::naming;
use segdl_core::probe::{probe, HeadResult};
use std::sync::atomic::AtomicBool;

/// `head` is reused when the caller already probed the URL.
pub async fn run_file(cfg: &SegdlConfig, url: &str, name: Option<&str>, head: Option<HeadResult>) -> Result<()> {
    let opts = TransferOptions::from_config(cfg);
    let head = match head {
        Some(h) => Some(h),
        None => {
            let probe_url = url.to_string();
            let probe_opts = opts.clone();
            match tokio::task::spawn_blocking(move || probe(&probe_url, &probe_opts)).await? {
                Ok(h) => Some(h),
                Err(e) => {
                    tracing::debug!(url, "HEAD failed, guessing extension from URL: {:#}", e);
                    None
                }
            }
        }
    };
    let ext = naming::extension_for(url, head.as_ref().and_then(|h| h.content_type.as_deref()));
    let base_name = naming::derive_base_name(url, name);
    if let Some(len) = head.as_ref().and_then(|h| h.content_length) {
        println!("{}.{}: {:.1} MiB", base_name, ext, len as f64 / 1_048_576.0);
    }

    let fetcher = Fetcher::new(cfg.retry_policy(), opts);
    let directory = cfg.download_dir.clone();
    let url = url.to_string();
    let saved = tokio::task::spawn_blocking(move || {
        download_file(&fetcher, &url, &directory, &base_name, &ext, &AtomicBool::new(false))
    })
    .await
    .context("fetch")?
    .context("fetch")?;

    println!("Saved to {}", saved.display());
    Ok(())
}
