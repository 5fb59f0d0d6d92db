use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per segment (including the first).
    pub max_attempts: u32,
    /// Backoff base in seconds; failed attempt `n` waits `base ^ n` seconds.
    pub backoff_base_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_base_secs: 2.0,
            max_delay_secs: 60,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff_base: self.backoff_base_secs,
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Global configuration loaded from `~/.config/segdl/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegdlConfig {
    /// Concurrent segment downloads per job.
    pub workers: usize,
    /// Directory for segments and output when `--dir` is not given.
    pub download_dir: PathBuf,
    /// Extension for segment files (`segment_<index>.<ext>`).
    pub segment_extension: String,
    /// Container extension for muxed output.
    pub output_extension: String,
    /// Receive buffer size in bytes; bounds the chunk written per callback.
    pub chunk_size: usize,
    pub connect_timeout_secs: u64,
    /// Seconds without any received byte before an attempt is abandoned.
    pub read_timeout_secs: u64,
    pub user_agent: String,
    /// Muxer binary invoked with the concat manifest.
    pub ffmpeg_path: PathBuf,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for SegdlConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            download_dir: PathBuf::from("downloads"),
            segment_extension: "ts".to_string(),
            output_extension: "mp4".to_string(),
            chunk_size: 64 * 1024,
            connect_timeout_secs: 15,
            read_timeout_secs: 15,
            user_agent: "Mozilla/5.0".to_string(),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            retry: None,
        }
    }
}

impl SegdlConfig {
    /// Effective retry policy (configured section or defaults).
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().policy()
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            bail!("workers must be at least 1");
        }
        if self.chunk_size == 0 {
            bail!("chunk_size must be at least 1");
        }
        // libcurl reads a zero timeout as "no timeout".
        if self.connect_timeout_secs == 0 {
            bail!("connect_timeout_secs must be at least 1");
        }
        if self.read_timeout_secs == 0 {
            bail!("read_timeout_secs must be at least 1");
        }
        if let Some(retry) = &self.retry {
            if retry.max_attempts == 0 {
                bail!("retry.max_attempts must be at least 1");
            }
            if !retry.backoff_base_secs.is_finite() || retry.backoff_base_secs < 0.0 {
                bail!("retry.backoff_base_secs must be a non-negative number");
            }
            if retry.max_delay_secs == 0 && retry.backoff_base_secs > 0.0 {
                bail!("retry.max_delay_secs must be at least 1 when backoff_base_secs is set");
            }
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("segdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SegdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SegdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SegdlConfig = toml::from_str(&data)?;
    cfg.validate()?;
    Ok(cfg)
}
