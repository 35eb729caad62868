//! URL modeling and filename derivation.
//!
//! A downloaded resource is saved under the last path segment of its URL.
//! Naming is a pluggable capability (`FilenameExtractor`) so a caller can swap
//! in a different policy without touching the downloader.

mod path;

pub use path::filename_from_url;

use thiserror::Error;

/// Why no local filename could be derived from a URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("empty URL")]
    Empty,
    /// Non-hierarchical URLs such as `mailto:user@host`.
    #[error("URL has no path separator: {0}")]
    NoPathSeparator(String),
    /// URL ends with `/`, so its last segment is empty.
    #[error("URL has an empty last path segment: {0}")]
    EmptySegment(String),
}

/// Maps a URL to the name of the local file it is saved as.
pub trait FilenameExtractor {
    fn extract(&self, url: &str) -> Result<String, ExtractError>;
}

/// Default extractor: last `/` segment with the query string stripped.
#[derive(Debug, Clone, Copy, Default)]
pub struct LastSegmentExtractor;

impl FilenameExtractor for LastSegmentExtractor {
    fn extract(&self, url: &str) -> Result<String, ExtractError> {
        filename_from_url(url)
    }
}

impl<F> FilenameExtractor for F
where
    F: Fn(&str) -> Result<String, ExtractError>,
{
    fn extract(&self, url: &str) -> Result<String, ExtractError> {
        self(url)
    }
}
