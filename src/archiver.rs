use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{error, info, warn};

use crate::error::{Result, ScrapeError};
use crate::models::{CSV_HEADER, Record};
use crate::timestamp;

/// Creates `dir` if it is missing. Returns whether it had to be created.
pub fn ensure_folder(dir: &Path) -> Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }
    info!(folder = %dir.display(), "no output folder exists");
    fs::create_dir_all(dir).map_err(|e| ScrapeError::io(dir, e))?;
    info!(folder = %dir.display(), "folder created");
    Ok(true)
}

/// `<dir>/<YYYY-M-D>.csv` for the given local date.
pub fn data_file_path(dir: &Path, date: &DateTime<Local>) -> PathBuf {
    dir.join(format!("{}.csv", timestamp::filename(date)))
}

pub fn to_csv(records: &[Record]) -> Result<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    // explicit header so an empty run still gets one
    wtr.write_record(CSV_HEADER)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.into_inner()
        .map_err(|e| ScrapeError::io("<csv buffer>", e.into_error()))
}

/// Writes the records to `path`, replacing whatever is there.
pub fn save_records(records: &[Record], path: &Path) -> Result<()> {
    info!(path = %path.display(), "creating file");
    if path.exists() {
        warn!(path = %path.display(), "file already exists, overwriting");
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_folder(parent)?;
        }
    }
    let payload = to_csv(records)?;
    fs::write(path, payload).map_err(|e| ScrapeError::io(path, e))
}

/// `[ <timestamp> ] <message>\n`
pub fn error_line<Tz: chrono::TimeZone>(at: &DateTime<Tz>, zone: &str, message: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("[ {} ] {}\n", timestamp::error(at, zone), message)
}

/// Appends one line to the error log. The log is never truncated.
pub fn append_error(log_path: &Path, err: &ScrapeError) -> Result<()> {
    let line = error_line(&Local::now(), &timestamp::local_zone_name(), &err.to_string());
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|e| ScrapeError::io(log_path, e))?;
    file.write_all(line.as_bytes())
        .map_err(|e| ScrapeError::io(log_path, e))
}

/// Like [`append_error`], but a failure to append only reaches the console.
pub fn log_error(log_path: &Path, err: &ScrapeError) {
    error!("{err}");
    if let Err(e) = append_error(log_path, err) {
        error!(error = %e, "there was an error appending the data to the error log");
    }
}
