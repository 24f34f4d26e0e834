use std::process::ExitCode;

mod derivative;
mod error;
mod generator;
mod logging;
mod state;

use error::OptimizeError;
use state::config::Config;

/// Exit status when there is nothing to do or the config is unusable
const EXIT_NO_WORK: u8 = 1;
/// Exit status when at least one derivative failed
const EXIT_PARTIAL_FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("❌ Cannot determine working directory: {}", e);
            return ExitCode::from(EXIT_NO_WORK);
        }
    };

    let config = match Config::load(&cwd) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::from(EXIT_NO_WORK);
        }
    };

    match generator::run(&config).await {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(EXIT_PARTIAL_FAILURE),
        Err(OptimizeError::NoImagesFound { dir }) => {
            eprintln!("❌ No existing images found in {}!", dir.display());
            ExitCode::from(EXIT_NO_WORK)
        }
        Err(e @ OptimizeError::InvalidConfig(_)) => {
            eprintln!("❌ {}", e);
            ExitCode::from(EXIT_NO_WORK)
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::from(EXIT_PARTIAL_FAILURE)
        }
    }
}
