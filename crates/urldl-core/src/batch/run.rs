//! Sequential batch loop.

use super::manifest::{read_manifest, ManifestEntry, ManifestOptions};
use super::report::{BatchReport, ManifestFailure, UrlOutcome};
use crate::downloader::UrlDownloader;
use crate::fetch::ResourceFetcher;
use crate::url_model::FilenameExtractor;
use std::path::Path;

/// Progress of `run_batch`, reported as it happens.
#[derive(Debug, Clone, Copy)]
pub enum BatchEvent<'a> {
    /// The entry's download is about to begin.
    Started(&'a ManifestEntry),
    /// The entry's download ended, successfully or not.
    Finished(&'a UrlOutcome),
    /// A manifest could not be read, or its decoding stopped at a malformed line.
    ManifestFailed(&'a ManifestFailure),
}

/// Downloads every URL of every manifest, in order, one at a time.
///
/// `on_event` sees each entry start and finish, and each manifest failure.
/// Failures (unreadable manifest, malformed line, any download error) are
/// recorded in the report and never stop the batch.
pub fn run_batch<E, F, P>(
    downloader: &UrlDownloader<E, F>,
    manifests: &[P],
    options: &ManifestOptions,
    mut on_event: impl FnMut(BatchEvent<'_>),
) -> BatchReport
where
    E: FilenameExtractor,
    F: ResourceFetcher,
    P: AsRef<Path>,
{
    let mut report = BatchReport::default();

    for manifest in manifests {
        let path = manifest.as_ref();
        let manifest = match read_manifest(path, options) {
            Ok(manifest) => manifest,
            Err(error) => {
                manifest_failed(&mut report, &mut on_event, path, error);
                continue;
            }
        };
        tracing::debug!(manifest = %path.display(), urls = manifest.entries.len(), "manifest loaded");

        for entry in manifest.entries {
            on_event(BatchEvent::Started(&entry));
            let result = downloader.download(&entry.url);
            if let Err(e) = &result {
                tracing::warn!(at = %entry, url = %entry.url, kind = %e.kind(), "download failed: {}", e);
            }
            let outcome = UrlOutcome { entry, result };
            on_event(BatchEvent::Finished(&outcome));
            report.outcomes.push(outcome);
        }

        if let Some(error) = manifest.error {
            manifest_failed(&mut report, &mut on_event, path, error);
        }
    }

    tracing::info!("batch finished: {}", report);
    report
}

fn manifest_failed(
    report: &mut BatchReport,
    on_event: &mut impl FnMut(BatchEvent<'_>),
    path: &Path,
    error: anyhow::Error,
) {
    tracing::warn!("manifest {}: {:#}", path.display(), error);
    let failure = ManifestFailure {
        path: path.to_path_buf(),
        error,
    };
    on_event(BatchEvent::ManifestFailed(&failure));
    report.manifest_failures.push(failure);
}
