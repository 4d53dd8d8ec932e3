//! Load session: owns the displayed coverage state and drives the retry
//! machine around one load.
//!
//! A load either replaces the session's record atomically (on success) or
//! leaves it untouched (on any abort). The retry decision is abstracted
//! behind [`RetryPrompt`] so the machine is testable without a dialog; the
//! binary plugs in [`ConsolePrompt`].

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{CovviewError, Result};
use crate::model::{CoverageRecord, LoadOutcome};
use crate::record;
use crate::source::SourceParser;
use crate::summarize::summarize;

/// Answers the retry/cancel question when a load-level failure occurs.
pub trait RetryPrompt {
    /// Return `true` to retry the load, `false` to abort the session.
    fn ask_retry(&mut self, error: &CovviewError) -> bool;
}

/// State of one load cycle.
#[derive(Debug)]
pub enum LoadState {
    Loading,
    FailedRetryable(CovviewError),
    Loaded(LoadOutcome),
    Aborted(CovviewError),
}

impl LoadState {
    /// Transition out of `Loading` given the attempt's result.
    #[must_use]
    pub fn on_attempt(result: Result<LoadOutcome>) -> LoadState {
        match result {
            Ok(outcome) => LoadState::Loaded(outcome),
            Err(err) => LoadState::FailedRetryable(err),
        }
    }

    /// Transition out of `FailedRetryable` given the retry decision.
    /// Any other state is unchanged.
    #[must_use]
    pub fn on_decision(self, retry: bool) -> LoadState {
        match self {
            LoadState::FailedRetryable(err) => {
                if retry {
                    LoadState::Loading
                } else {
                    LoadState::Aborted(err)
                }
            }
            other => other,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadState::Loaded(_) | LoadState::Aborted(_))
    }
}

/// Owns the current coverage record across loads.
pub struct Session<P> {
    data_path: PathBuf,
    parser: P,
    current: CoverageRecord,
    /// Paths carrying annotations from the latest successful load.
    annotated: BTreeSet<String>,
    loaded_at: Option<DateTime<Local>>,
}

impl<P: SourceParser> Session<P> {
    pub fn new(data_path: impl Into<PathBuf>, parser: P) -> Self {
        Self {
            data_path: data_path.into(),
            parser,
            current: CoverageRecord::new(),
            annotated: BTreeSet::new(),
            loaded_at: None,
        }
    }

    #[must_use]
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// The latest successfully loaded record.
    #[must_use]
    pub fn record(&self) -> &CoverageRecord {
        &self.current
    }

    #[must_use]
    pub fn loaded_at(&self) -> Option<DateTime<Local>> {
        self.loaded_at
    }

    /// One load attempt with no retry loop. On error the session state is
    /// untouched; on success the record is replaced wholesale.
    pub fn load_once(&mut self) -> Result<LoadOutcome> {
        let fresh = record::load(&self.data_path)?;
        let outcome = summarize(&fresh, &self.parser, &self.annotated);

        self.current = fresh;
        self.annotated = outcome.files.keys().cloned().collect();
        self.loaded_at = Some(Local::now());
        Ok(outcome)
    }

    /// Drive the retry machine until `Loaded` or `Aborted`, asking `prompt`
    /// after each failure. An abort hands back the final error exactly once.
    pub fn load(&mut self, prompt: &mut dyn RetryPrompt) -> Result<LoadOutcome> {
        let mut state = LoadState::Loading;
        loop {
            state = match state {
                LoadState::Loading => LoadState::on_attempt(self.load_once()),
                LoadState::FailedRetryable(err) => {
                    let retry = prompt.ask_retry(&err);
                    LoadState::FailedRetryable(err).on_decision(retry)
                }
                LoadState::Loaded(outcome) => return Ok(outcome),
                LoadState::Aborted(err) => return Err(err),
            };
        }
    }
}

/// Interactive retry prompt on stderr/stdin. EOF counts as cancel, so piped
/// invocations fail cleanly instead of hanging.
pub struct ConsolePrompt;

impl RetryPrompt for ConsolePrompt {
    fn ask_retry(&mut self, error: &CovviewError) -> bool {
        match error {
            CovviewError::DataUnavailable { path, .. } => eprintln!(
                "Couldn't find coverage data file {}. Have you generated coverage data?",
                path.display()
            ),
            CovviewError::DataCorrupt { path, .. } => eprintln!(
                "Couldn't load coverage data from {} -- the file may be corrupted.",
                path.display()
            ),
            other => eprintln!("{other}"),
        }
        eprint!("Retry? [y/N] ");

        let mut answer = String::new();
        if std::io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unavailable() -> CovviewError {
        CovviewError::DataUnavailable {
            path: PathBuf::from(".coverage"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        }
    }

    #[test]
    fn test_attempt_success_is_loaded() {
        let state = LoadState::on_attempt(Ok(LoadOutcome::default()));
        assert!(matches!(state, LoadState::Loaded(_)));
        assert!(state.is_terminal());
    }

    #[test]
    fn test_attempt_failure_is_retryable() {
        let state = LoadState::on_attempt(Err(unavailable()));
        assert!(matches!(state, LoadState::FailedRetryable(_)));
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_retry_decision_returns_to_loading() {
        let state = LoadState::FailedRetryable(unavailable()).on_decision(true);
        assert!(matches!(state, LoadState::Loading));
    }

    #[test]
    fn test_cancel_decision_aborts() {
        let state = LoadState::FailedRetryable(unavailable()).on_decision(false);
        match state {
            LoadState::Aborted(CovviewError::DataUnavailable { .. }) => {}
            other => panic!("expected Aborted(DataUnavailable), got {other:?}"),
        }
    }

    #[test]
    fn test_decision_leaves_other_states_alone() {
        let state = LoadState::Loading.on_decision(false);
        assert!(matches!(state, LoadState::Loading));
    }
}
