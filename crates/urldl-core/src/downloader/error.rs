//! Download error type and its coarse classification.

use crate::fetch::FetchError;
use crate::storage::StoreError;
use crate::url_model::ExtractError;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error returned by `UrlDownloader::download`. The variant tells which stage
/// failed; the stage's own error is kept intact.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("cannot derive a filename: {0}")]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// Creating or writing the local file failed.
    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<StoreError> for DownloadError {
    fn from(err: StoreError) -> Self {
        match err {
            // Reading the fetch stream failed after the status was accepted.
            StoreError::Source(e) => DownloadError::Fetch(FetchError::from_read_error(e)),
            StoreError::Sink { path, source } => DownloadError::Io { path, source },
        }
    }
}

/// Failure category used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    /// Manifest could not be read or decoded.
    Manifest,
    Extraction,
    Status,
    Transport,
    LocalIo,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Manifest => "manifest",
            FailureKind::Extraction => "extraction",
            FailureKind::Status => "http status",
            FailureKind::Transport => "transport",
            FailureKind::LocalIo => "local i/o",
        };
        f.write_str(s)
    }
}

impl DownloadError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DownloadError::Extract(_) => FailureKind::Extraction,
            DownloadError::Fetch(FetchError::Status { .. }) => FailureKind::Status,
            DownloadError::Fetch(FetchError::Transport(_)) => FailureKind::Transport,
            DownloadError::Io { .. } => FailureKind::LocalIo,
        }
    }
}
