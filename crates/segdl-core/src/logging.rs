//! Diagnostics for segdl runs.
//!
//! Progress lines go to stdout from the CLI; everything recorded through
//! `tracing` (retry warnings, range restarts, skipped subtitle tracks, mux
//! command lines) lands in an append-only `segdl.log` so a long HLS job can be
//! inspected after the terminal is gone. `RUST_LOG` overrides the filter.

use anyhow::Result;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Engine and CLI events at debug, dependencies at info.
const DEFAULT_FILTER: &str = "info,segdl=debug,segdl_core=debug,segdl_cli=debug";

const LOG_FILE_NAME: &str = "segdl.log";

/// Destination for one formatted event. Segment workers log from several
/// threads, so each event gets its own handle to the shared log file.
enum LogSink {
    File(fs::File),
    Stderr,
}

impl io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogSink::File(f) => f.write(buf),
            LogSink::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogSink::File(f) => f.flush(),
            LogSink::Stderr => io::stderr().lock().flush(),
        }
    }
}

/// Hands out clones of the log file handle; an event whose clone fails is
/// written to stderr instead of being dropped.
struct SharedLogFile(fs::File);

impl<'a> MakeWriter<'a> for SharedLogFile {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        match self.0.try_clone() {
            Ok(file) => LogSink::File(file),
            Err(_) => LogSink::Stderr,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Creates `dir` if needed and opens `dir/segdl.log` for appending.
fn open_log_file(dir: &Path) -> Result<(fs::File, PathBuf)> {
    fs::create_dir_all(dir)?;
    let path = dir.join(LOG_FILE_NAME);
    let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((file, path))
}

/// Installs the global subscriber writing to `$XDG_STATE_HOME/segdl/segdl.log`
/// and returns the log path.
///
/// Fails when the state directory cannot be created or the file cannot be
/// opened; `segdl` then calls [`init_logging_stderr`] and carries on.
pub fn init_logging() -> Result<PathBuf> {
    let state_dir = xdg::BaseDirectories::with_prefix("segdl")?.get_state_home();
    let (file, path) = open_log_file(&state_dir)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(BoxMakeWriter::new(SharedLogFile(file)))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    tracing::info!(log = %path.display(), "segdl {} starting", env!("CARGO_PKG_VERSION"));
    Ok(path)
}

/// Stderr-only subscriber for hosts without a writable state directory.
/// A second call is a no-op.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}
