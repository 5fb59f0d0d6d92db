//! CLI for the segdl segmented downloader.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use segdl_core::config::{self, SegdlConfig};
use std::path::PathBuf;

use commands::{run_file, run_get, run_hls, run_list};

/// Top-level CLI for segdl.
#[derive(Debug, Parser)]
#[command(name = "segdl")]
#[command(about = "segdl: parallel segmented media downloader", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Output options shared by every download command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct OutputArgs {
    /// Output base name (default: last URL path segment without extension).
    #[arg(long)]
    pub name: Option<String>,

    /// Directory for segments and output (default: `download_dir` from config).
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Concurrent segment downloads (default: `workers` from config).
    #[arg(long, value_name = "N")]
    pub parallel: Option<usize>,
}

impl OutputArgs {
    /// Override config values with the flags that were given.
    pub fn apply(&self, cfg: &mut SegdlConfig) {
        if let Some(dir) = &self.dir {
            cfg.download_dir = dir.clone();
        }
        if let Some(parallel) = self.parallel {
            cfg.workers = parallel;
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a URL, detecting HLS playlists by extension or content type.
    Get {
        /// HTTP/HTTPS URL of a playlist or a plain file.
        url: String,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Download an HLS playlist (master or media) and merge its segments.
    Hls {
        /// Playlist URL.
        url: String,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Download the segment URLs listed in a file (one per line) and merge them.
    List {
        /// Path to the list file.
        file: PathBuf,

        /// Base URL for relative entries.
        #[arg(long)]
        base: Option<String>,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Download a single file without segmenting or merging.
    File {
        /// Direct HTTP/HTTPS URL.
        url: String,
        #[command(flatten)]
        out: OutputArgs,
    },
}

impl CliCommand {
    fn output_args(&self) -> &OutputArgs {
        match self {
            CliCommand::Get { out, .. }
            | CliCommand::Hls { out, .. }
            | CliCommand::List { out, .. }
            | CliCommand::File { out, .. } => out,
        }
    }

    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        cli.command.output_args().apply(&mut cfg);
        cfg.validate()?;
        tracing::debug!("effective config: {:?}", cfg);

        match cli.command {
            CliCommand::Get { url, out } => run_get(&cfg, &url, out.name.as_deref()).await?,
            CliCommand::Hls { url, out } => run_hls(&cfg, &url, out.name.as_deref()).await?,
            CliCommand::List { file, base, out } => {
                run_list(&cfg, &file, base.as_deref(), out.name.as_deref()).await?
            }
            CliCommand::File { url, out } => run_file(&cfg, &url, out.name.as_deref(), None).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
