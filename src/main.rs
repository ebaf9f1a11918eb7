mod archiver;
mod config;
mod error;
mod fetcher;
mod models;
mod parser;
mod pipeline;
mod timestamp;
mod walker;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::ScraperConfig;
use crate::fetcher::HttpFetcher;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ScraperConfig::default();
    let outcome = pipeline::run_with(&config, HttpFetcher::new(&config));

    // success and failure both exit 0; the files on disk are the signal
    if outcome.had_error() {
        warn!(
            state = ?outcome.state,
            errors = outcome.errors.len(),
            log = %config.error_log_path().display(),
            "no data file written this run"
        );
    } else if let Some(path) = &outcome.data_file {
        info!(
            state = ?outcome.state,
            records = outcome.records_written,
            path = %path.display(),
            "scraped products archived"
        );
    }
    Ok(())
}
