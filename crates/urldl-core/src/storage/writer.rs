//! Output file handle for a single download.

use crate::config::WriteMode;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Open output file. In atomic mode the bytes go to a `.part` sibling that is
/// renamed over the final path by `finalize`, and removed if the handle is
/// dropped without finalizing.
pub struct OutputFile {
    file: Option<File>,
    final_path: PathBuf,
    temp_path: Option<PathBuf>,
}

impl OutputFile {
    /// Create (or truncate) the file the bytes are written to.
    pub fn create(final_path: &Path, mode: WriteMode) -> io::Result<Self> {
        let temp_path = match mode {
            WriteMode::Direct => None,
            WriteMode::Atomic => Some(super::temp_path(final_path)),
        };
        let target = temp_path.as_deref().unwrap_or(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(target)?;
        Ok(Self {
            file: Some(file),
            final_path: final_path.to_path_buf(),
            temp_path,
        })
    }

    /// Path currently being written (the `.part` file in atomic mode).
    pub fn path(&self) -> &Path {
        self.temp_path.as_deref().unwrap_or(&self.final_path)
    }

    pub fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        match self.file.as_mut() {
            Some(f) => f.write_all(data),
            None => Err(io::Error::other("output file already finalized")),
        }
    }

    /// Flush and close. In atomic mode also fsync and rename onto the final
    /// path; on failure the `.part` file is removed.
    pub fn finalize(mut self) -> io::Result<()> {
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };
        let mut result = file.flush();
        if result.is_ok() && self.temp_path.is_some() {
            result = file.sync_all();
        }
        drop(file);

        if let Some(temp) = &self.temp_path {
            result = result.and_then(|()| fs::rename(temp, &self.final_path));
            if result.is_err() {
                let _ = fs::remove_file(temp);
            }
        }
        result
    }
}

impl Drop for OutputFile {
    fn drop(&mut self) {
        if self.file.take().is_none() {
            return;
        }
        if let Some(temp) = &self.temp_path {
            if let Err(e) = fs::remove_file(temp) {
                tracing::debug!("could not remove {}: {}", temp.display(), e);
            }
        }
    }
}
