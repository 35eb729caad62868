//! Run the batch described by the command line and print its outcome.

use anyhow::Result;
use urldl_core::config::{UrldlConfig, WriteMode};
use urldl_core::{
    run_batch, BatchEvent, BatchReport, CurlFetcher, LastSegmentExtractor, ManifestOptions,
    UrlDownloader,
};

use super::Cli;

/// Builds the downloader from `cli` over `cfg` and downloads every listed URL.
pub fn run_downloads(cli: &Cli, cfg: &UrldlConfig) -> Result<BatchReport> {
    let label = cli.encoding.as_deref().unwrap_or(&cfg.encoding);
    let options = ManifestOptions::from_label(label, cli.skip_blank_lines || cfg.skip_blank_lines)?;
    let write_mode = if cli.atomic {
        WriteMode::Atomic
    } else {
        cfg.write_mode()
    };

    let mut downloader = UrlDownloader::new(
        LastSegmentExtractor,
        CurlFetcher::new(cfg.curl_options()),
    )
    .with_write_mode(write_mode);
    if let Some(dir) = &cli.output_dir {
        downloader = downloader.with_output_dir(dir);
    }

    let report = run_batch(&downloader, &cli.files, &options, print_event);
    println!("{}", report);
    Ok(report)
}

fn print_event(event: BatchEvent<'_>) {
    match event {
        BatchEvent::Started(entry) => println!("Downloading {}", entry.url),
        BatchEvent::Finished(outcome) => match &outcome.result {
            Ok(path) => println!("Saved {}", path.display()),
            Err(e) => eprintln!("{}: {}: {}", outcome.entry, outcome.entry.url, e),
        },
        BatchEvent::ManifestFailed(failure) => {
            eprintln!("{:#}", failure.error);
        }
    }
}
