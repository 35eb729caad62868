//! CLI for urldl.

mod run;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use urldl_core::config;
use urldl_core::BatchReport;

pub use run::run_downloads;

/// Download web content from text URLs in a file.
#[derive(Debug, Parser)]
#[command(name = "urldl")]
#[command(about = "Download web content from text URLs in a file", long_about = None)]
pub struct Cli {
    /// A file which contains one URL per line.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Encoding of the files (default from config, "utf-8" out of the box).
    ///
    /// WHATWG labels such as "utf-8", "latin1", "shift_jis"; Python-style
    /// spellings ("latin-1", "utf_8", "utf-8-sig") also work. "latin1" and
    /// "iso-8859-1" decode as windows-1252. A byte order mark overrides it.
    #[arg(short, long, value_name = "LABEL")]
    pub encoding: Option<String>,

    /// Write to "<name>.part" and rename it only after a complete download.
    #[arg(long)]
    pub atomic: bool,

    /// Ignore blank lines instead of reporting them as failed URLs.
    #[arg(long)]
    pub skip_blank_lines: bool,

    /// Directory to save files into (default: current directory).
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

impl Cli {
    /// Parses arguments, loads config and runs the batch. Errors are setup
    /// failures; per-URL failures are in the returned report.
    pub fn run_from_args() -> Result<BatchReport> {
        let cli = Cli::parse();
        let cfg = config::load_or_init().context("load config")?;
        tracing::debug!("loaded config: {:?}", cfg);
        run_downloads(&cli, &cfg)
    }
}
