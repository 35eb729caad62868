use std::process::ExitCode;

use urldl_core::logging;

mod cli;

use crate::cli::Cli;

fn main() -> ExitCode {
    // Initialize logging as early as possible.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {:#}", err);
    }

    // Parse CLI and run the batch.
    match Cli::run_from_args() {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("urldl error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
