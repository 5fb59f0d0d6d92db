//! External muxer seam. The engine only cares about the exit code.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Joins ordered segment files into one container.
///
/// Returns the process exit code; `None` means the process ended without one
/// (killed by a signal). Spawn failures are `Err`.
pub trait Muxer: Send + Sync {
    fn mux(&self, ordered_paths: &[PathBuf], manifest: &Path, output: &Path) -> io::Result<Option<i32>>;
}

/// Runs `ffmpeg -y -f concat -safe 0 -i <manifest> -c copy <output>`.
#[derive(Debug, Clone)]
pub struct FfmpegMuxer {
    program: PathBuf,
}

impl FfmpegMuxer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The full command line, for logging and tests.
    pub fn command(&self, manifest: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-y")
            .args(["-f", "concat", "-safe", "0", "-i"])
            .arg(manifest)
            .args(["-c", "copy"])
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl Default for FfmpegMuxer {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl Muxer for FfmpegMuxer {
    fn mux(&self, ordered_paths: &[PathBuf], manifest: &Path, output: &Path) -> io::Result<Option<i32>> {
        tracing::debug!(
            program = %self.program.display(),
            segments = ordered_paths.len(),
            manifest = %manifest.display(),
            output = %output.display(),
            "running muxer"
        );
        let status = self.command(manifest, output).status()?;
        Ok(status.code())
    }
}
