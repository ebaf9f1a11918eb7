use std::path::PathBuf;

use chrono::{DateTime, Local};
use tracing::{debug, error, info};

use crate::archiver;
use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};
use crate::fetcher::Fetch;
use crate::models::Record;
use crate::parser::PageSelectors;
use crate::walker::{SiteWalker, WalkEvent};

/// `NotStarted -> Running -> (Success | Error) -> Terminated`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Success,
    Error,
    Terminated,
}

impl RunState {
    pub fn can_advance_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (NotStarted, Running) | (Running, Success) | (Running, Error) | (Success, Terminated) | (Error, Terminated)
        )
    }
}

/// Records of the current run, in the order they were produced.
#[derive(Debug, Default)]
pub struct Accumulator {
    records: Vec<Record>,
}

impl Accumulator {
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

#[derive(Debug)]
pub struct RunOutcome {
    /// `Success` or `Error`, the state the run ended in before terminating.
    pub state: RunState,
    pub records_accumulated: usize,
    /// Rows in the data file; zero when the file was withheld.
    pub records_written: usize,
    pub errors: Vec<ScrapeError>,
    pub data_file: Option<PathBuf>,
}

impl RunOutcome {
    pub fn had_error(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Runs with `fetcher`, or, when it could not be built, records that as the
/// run's only error so it still reaches the error log.
pub fn run_with<F: Fetch>(config: &ScraperConfig, fetcher: Result<F>) -> RunOutcome {
    match fetcher {
        Ok(fetcher) => Run::new(config, &fetcher).execute(),
        Err(e) => {
            let mut errors = Vec::new();
            if let Err(dir_err) = archiver::ensure_folder(&config.output_dir) {
                error!(error = %dir_err, "could not create the output folder");
                errors.push(dir_err);
            }
            archiver::log_error(&config.error_log_path(), &e);
            errors.push(e);
            RunOutcome {
                state: RunState::Error,
                records_accumulated: 0,
                records_written: 0,
                errors,
                data_file: None,
            }
        }
    }
}

pub struct Run<'a, F: Fetch> {
    config: &'a ScraperConfig,
    fetcher: &'a F,
    state: RunState,
}

impl<'a, F: Fetch> Run<'a, F> {
    pub fn new(config: &'a ScraperConfig, fetcher: &'a F) -> Self {
        Self {
            config,
            fetcher,
            state: RunState::NotStarted,
        }
    }

    fn advance(&mut self, next: RunState) {
        debug_assert!(self.state.can_advance_to(next), "{:?} -> {:?}", self.state, next);
        debug!(from = ?self.state, to = ?next, "run state");
        self.state = next;
    }

    pub fn execute(self) -> RunOutcome {
        self.execute_on(Local::now())
    }

    /// Runs once, naming the data file after `started`'s calendar date.
    pub fn execute_on(mut self, started: DateTime<Local>) -> RunOutcome {
        self.advance(RunState::Running);
        info!(url = %self.config.base_url, "Scraping process......... START");

        let config = self.config;
        let log_path = config.error_log_path();
        let mut errors = Vec::new();
        let mut accumulator = Accumulator::default();
        let mut data_file = None;

        let prepared = archiver::ensure_folder(&config.output_dir)
            .and_then(|_| PageSelectors::compile(&config.selectors));

        match prepared {
            Err(e) => {
                archiver::log_error(&log_path, &e);
                errors.push(e);
            }
            Ok(selectors) => {
                let walker = SiteWalker::new(self.fetcher, &selectors, config.run_timeout);
                walker.walk(&config.base_url, |event| match event {
                    WalkEvent::Product(raw) => accumulator.push(Record::normalize(raw, &config.base_url)),
                    WalkEvent::Error(e) => {
                        archiver::log_error(&log_path, &e);
                        errors.push(e);
                    }
                    WalkEvent::Done => {
                        if !errors.is_empty() {
                            error!(
                                errors = errors.len(),
                                "An error has happened during the execution. Please restart the process"
                            );
                            return;
                        }
                        let path = archiver::data_file_path(&config.output_dir, &started);
                        match archiver::save_records(accumulator.records(), &path) {
                            Ok(()) => {
                                info!(path = %path.display(), records = accumulator.len(), "Scraping process......... END");
                                data_file = Some(path);
                            }
                            Err(e) => {
                                archiver::log_error(&log_path, &e);
                                error!("There was an error when writing the output file, please execute the scraper again");
                                errors.push(e);
                            }
                        }
                    }
                });
            }
        }

        let end = if errors.is_empty() {
            RunState::Success
        } else {
            RunState::Error
        };
        self.advance(end);
        let outcome = RunOutcome {
            state: self.state,
            records_accumulated: accumulator.len(),
            records_written: if data_file.is_some() { accumulator.len() } else { 0 },
            errors,
            data_file,
        };
        self.advance(RunState::Terminated);
        outcome
    }
}
