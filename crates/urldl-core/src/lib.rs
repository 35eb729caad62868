pub mod config;
pub mod logging;

pub mod batch;
pub mod downloader;
pub mod fetch;
pub mod storage;
pub mod url_model;

pub use batch::{run_batch, BatchEvent, BatchReport, ManifestEntry, ManifestOptions};
pub use downloader::{DownloadError, FailureKind, UrlDownloader};
pub use fetch::{CurlFetcher, CurlOptions, FetchError, ResourceFetcher};
pub use url_model::{ExtractError, FilenameExtractor, LastSegmentExtractor};
