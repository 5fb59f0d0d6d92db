//! Append-only writer for `.part` files.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Temp file for one transfer. Opened in append mode so a resumed transfer
/// continues exactly where the previous one stopped; `len` tracks the bytes
/// on disk without re-stat'ing after every chunk.
pub struct PartFile {
    file: File,
    temp_path: PathBuf,
    len: u64,
}

impl PartFile {
    /// Open (creating if missing) the temp file at `temp_path` without truncation.
    pub fn open(temp_path: &Path) -> io::Result<Self> {
        let file = File::options()
            .create(true)
            .append(true)
            .open(temp_path)?;
        let len = file.metadata()?.len();
        Ok(PartFile {
            file,
            temp_path: temp_path.to_path_buf(),
            len,
        })
    }

    /// Bytes currently on disk.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Path to the temp file.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Append one chunk at the end of the file.
    pub fn append(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.len += data.len() as u64;
        Ok(())
    }

    /// Drop every byte on disk so the next append starts at offset 0.
    pub fn reset(&mut self) -> io::Result<()> {
        self.file.set_len(0)?;
        self.len = 0;
        Ok(())
    }

    /// Sync file data to disk. Call before `finalize` for durability.
    pub fn sync(&self) -> io::Result<()> {
        self.file.sync_all()
    }

    /// Atomically rename the temp file to `final_path`. Consumes the writer and
    /// closes the file. Fails if `final_path` is on a different filesystem.
    pub fn finalize(self, final_path: &Path) -> io::Result<()> {
        let PartFile { file, temp_path, .. } = self;
        drop(file);
        std::fs::rename(&temp_path, final_path).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!(
                    "failed to rename {} to {}: {}",
                    temp_path.display(),
                    final_path.display(),
                    e
                ),
            )
        })
    }
}
