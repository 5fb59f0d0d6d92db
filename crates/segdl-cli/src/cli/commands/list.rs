//! `segdl list` – download and merge segments listed in a file.

use anyhow::{Context, Result};
use segdl_core::config::SegdlConfig;
use segdl_core::naming;
use segdl_core::source::parse_url_list;
use std::path::Path;
use url::Url;

use super::pipeline::run_segments;

pub async fn run_list(cfg: &SegdlConfig, file: &Path, base: Option<&str>, name: Option<&str>) -> Result<()> {
    let text = std::fs::read_to_string(file).with_context(|| format!("cannot read {}", file.display()))?;
    let base = base
        .map(|b| Url::parse(b).with_context(|| format!("invalid base URL: {}", b)))
        .transpose()?;
    let specs = parse_url_list(&text, base.as_ref()).context("fetch")?;
    if specs.is_empty() {
        anyhow::bail!("{} lists no segment URLs", file.display());
    }

    let stem = file.file_stem().map(|s| s.to_string_lossy().into_owned());
    let base_name = naming::derive_base_name("", name.or(stem.as_deref()));
    run_segments(cfg, specs, &base_name).await?;
    Ok(())
}
