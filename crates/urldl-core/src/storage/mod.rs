//! Disk I/O and file lifecycle.
//!
//! Copies a fetched stream into the output file. In `Direct` mode the target
//! is created (or truncated) and written in place; in `Atomic` mode the bytes
//! go to `<name>.part` and are renamed over the target only after a complete
//! copy.

mod writer;

pub use writer::OutputFile;

use crate::config::WriteMode;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

const BUF_SIZE: usize = 64 * 1024;

/// Path for the temp file: appends `.part` to the final path (e.g. `file.iso` → `file.iso.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Failure while copying a stream to disk, split by which side failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read from source: {0}")]
    Source(#[source] io::Error),
    #[error("failed to write {}: {source}", .path.display())]
    Sink {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn sink(path: &Path, source: io::Error) -> StoreError {
    StoreError::Sink {
        path: path.to_path_buf(),
        source,
    }
}

/// Copies `reader` to `final_path` until EOF and returns the number of bytes written.
///
/// The output file is closed before this returns. In `Direct` mode a failure
/// mid-copy leaves a partial file behind.
pub fn write_stream<R>(final_path: &Path, reader: &mut R, mode: WriteMode) -> Result<u64, StoreError>
where
    R: Read + ?Sized,
{
    let mut out = OutputFile::create(final_path, mode).map_err(|e| sink(final_path, e))?;
    let mut buf = vec![0u8; BUF_SIZE];
    let mut written = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(StoreError::Source(e)),
        };
        out.write_all(&buf[..n])
            .map_err(|e| sink(out.path(), e))?;
        written += n as u64;
    }
    out.finalize().map_err(|e| sink(final_path, e))?;
    Ok(written)
}
