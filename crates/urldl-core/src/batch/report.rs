//! Per-URL results of a batch run.

use super::ManifestEntry;
use crate::downloader::{DownloadError, FailureKind};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Result of downloading one manifest line.
#[derive(Debug)]
pub struct UrlOutcome {
    pub entry: ManifestEntry,
    /// Saved path, or why the download failed.
    pub result: Result<PathBuf, DownloadError>,
}

impl UrlOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// A manifest that could not be read (none of its URLs were tried) or whose
/// decoding stopped at a malformed line (the lines before it were tried).
#[derive(Debug)]
pub struct ManifestFailure {
    pub path: PathBuf,
    pub error: anyhow::Error,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<UrlOutcome>,
    pub manifest_failures: Vec<ManifestFailure>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Failed URLs plus unreadable manifests.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded() + self.manifest_failures.len()
    }

    /// True only if every manifest was read and every URL was downloaded.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = (&ManifestEntry, &DownloadError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.entry, e)))
    }

    pub fn failure_counts(&self) -> BTreeMap<FailureKind, usize> {
        let mut counts = BTreeMap::new();
        for (_, err) in self.failures() {
            *counts.entry(err.kind()).or_insert(0) += 1;
        }
        if !self.manifest_failures.is_empty() {
            counts.insert(FailureKind::Manifest, self.manifest_failures.len());
        }
        counts
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} succeeded, {} failed", self.succeeded(), self.failed())?;
        let counts = self.failure_counts();
        if !counts.is_empty() {
            let parts: Vec<String> = counts
                .iter()
                .map(|(kind, n)| format!("{}: {}", kind, n))
                .collect();
            write!(f, " ({})", parts.join(", "))?;
        }
        Ok(())
    }
}
