//! Batch driver: download every URL listed in a set of manifest files.
//!
//! Manifests are read in order and their URLs downloaded one at a time. A
//! failure is recorded in the `BatchReport` and the batch moves on; the caller
//! decides what a failed report means (the CLI turns it into exit code 1).

mod manifest;
mod report;
mod run;

pub use manifest::{
    decode_manifest, parse_manifest, read_manifest, Decoded, Manifest, ManifestEntry,
    ManifestOptions,
};
pub use report::{BatchReport, ManifestFailure, UrlOutcome};
pub use run::{run_batch, BatchEvent};
