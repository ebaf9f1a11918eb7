use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Everything that can go wrong while walking the site or writing its output.
///
/// The `Display` text is what ends up in the error log after the timestamp.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("no results for \"{selector}\" in {url}")]
    NoMatch { url: String, selector: String },

    #[error("\"{selector}\" in {url} has no {attribute} attribute")]
    MissingAttribute {
        url: String,
        selector: String,
        attribute: &'static str,
    },

    #[error("invalid selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("run exceeded its time limit after {elapsed:?}")]
    RunTimeout { elapsed: Duration },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv serialization failed: {0}")]
    Csv(#[from] csv::Error),
}

impl ScrapeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScrapeError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
