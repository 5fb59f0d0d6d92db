//! Shared segmented pipeline: download every segment, then merge.

use anyhow::{Context, Result};
use segdl_core::assemble::{Assembler, FfmpegMuxer};
use segdl_core::config::SegdlConfig;
use segdl_core::fetcher::{Fetcher, TransferOptions};
use segdl_core::naming;
use segdl_core::orchestrator::Orchestrator;
use segdl_core::progress::ProgressStats;
use segdl_core::segment::SegmentSpec;
use std::path::PathBuf;
use std::time::Instant;

const PROGRESS_INTERVAL_MS: u64 = 500;

/// Download `specs` into `<download_dir>/<base>_segments/` and merge them into
/// `<download_dir>/<base>.<output_extension>`. Returns the output path.
pub async fn run_segments(cfg: &SegdlConfig, specs: Vec<SegmentSpec>, base_name: &str) -> Result<PathBuf> {
    let work_dir = cfg.download_dir.join(format!("{}_segments", base_name));
    let output = cfg
        .download_dir
        .join(naming::file_name(base_name, &cfg.output_extension));
    println!("{} segment(s), {} worker(s)", specs.len(), cfg.workers);

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<ProgressStats>(16);
    let progress_handle = tokio::spawn(async move {
        let mut last_print = Instant::now();
        while let Some(stats) = progress_rx.recv().await {
            let now = Instant::now();
            if now.duration_since(last_print).as_millis() as u64 >= PROGRESS_INTERVAL_MS || stats.is_complete() {
                println!(
                    "  {}/{} segments ({:.1}%)  {:.1} MiB  {:.2} MiB/s",
                    stats.segments_done,
                    stats.segment_count,
                    stats.fraction() * 100.0,
                    stats.bytes_done as f64 / 1_048_576.0,
                    stats.bytes_per_sec() / 1_048_576.0,
                );
                last_print = now;
            }
        }
    });

    let fetcher = Fetcher::new(cfg.retry_policy(), TransferOptions::from_config(cfg));
    let orchestrator = Orchestrator::new(fetcher, &cfg.segment_extension, cfg.workers)
        .context("orchestration")?
        .with_progress(progress_tx);
    let dir = work_dir.clone();
    let downloaded = tokio::task::spawn_blocking(move || orchestrator.run(&specs, &dir))
        .await
        .context("orchestration")?;
    // The orchestrator (and its sender) is gone; the printer drains and exits.
    let _ = progress_handle.await;
    let ordered = downloaded.context("orchestration")?;

    let assembler = Assembler::new(Box::new(FfmpegMuxer::new(cfg.ffmpeg_path.clone())));
    let written = tokio::task::spawn_blocking(move || assembler.assemble(&ordered, &output))
        .await
        .context("assembly")?
        .context("assembly")?;

    if std::fs::remove_dir(&work_dir).is_err() {
        tracing::debug!(dir = %work_dir.display(), "segment directory not removed");
    }
    println!("Saved to {}", written.display());
    Ok(written)
}
