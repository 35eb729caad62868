//! Resource fetching.
//!
//! A `ResourceFetcher` opens a URL and hands back a byte stream that is only
//! valid for one download. Success is decided by the fetcher (status 200 for
//! HTTP); everything else is an error and no stream is returned. Protocol
//! backends are added as new implementations of the trait.

mod http;
mod parse;

pub use http::{CurlFetcher, CurlOptions, CurlStream};

use std::error::Error as StdError;
use std::io::{self, Read};
use thiserror::Error;

/// Boxed underlying transport failure (curl error, I/O error, ...).
pub type TransportSource = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Server answered with something other than 200.
    #[error("download failed: {url} returned HTTP {code}")]
    Status { url: String, code: u32 },
    /// Connection-level failure; the original error is kept as the source.
    #[error("transport error: {0}")]
    Transport(#[source] TransportSource),
}

impl FetchError {
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<TransportSource>,
    {
        FetchError::Transport(err.into())
    }

    /// Wraps a failure that surfaced while reading a fetch stream. A
    /// `curl::Error` carried inside the `io::Error` becomes the source itself,
    /// so callers see the same error type before and after the status line.
    pub fn from_read_error(err: io::Error) -> Self {
        match err.downcast::<curl::Error>() {
            Ok(curl_err) => FetchError::transport(curl_err),
            Err(err) => FetchError::transport(err),
        }
    }

    /// HTTP status code for `Status` errors.
    pub fn status_code(&self) -> Option<u32> {
        match self {
            FetchError::Status { code, .. } => Some(*code),
            FetchError::Transport(_) => None,
        }
    }

    /// Underlying transport error, if this is a `Transport` failure.
    pub fn transport_source(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            FetchError::Transport(e) => Some(&**e),
            FetchError::Status { .. } => None,
        }
    }
}

/// Opens a resource as a readable stream.
///
/// The returned stream owns every resource of the fetch; dropping it releases
/// them, whether or not it was read to the end.
pub trait ResourceFetcher {
    type Stream: Read;

    fn fetch(&self, url: &str) -> Result<Self::Stream, FetchError>;
}
