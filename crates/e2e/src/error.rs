//! Error types for build lifecycle tracking

use std::time::Duration;
use thiserror::Error;

use ciprobe_common::Outcome;

#[derive(Error, Debug)]
pub enum E2eError {
    /// The resource does not exist (yet, or any more).
    #[error("Not found: {url}")]
    NotFound { url: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Malformed status document from {url}: {reason}")]
    MalformedDocument { url: String, reason: String },

    #[error(
        "Timed out waiting for {condition} after {:.1}s (budget {:.1}s)",
        .elapsed.as_secs_f64(),
        .budget.as_secs_f64()
    )]
    Timeout {
        condition: String,
        elapsed: Duration,
        budget: Duration,
    },

    #[error("Unknown build outcome '{0}'")]
    UnknownOutcome(String),

    #[error("{build}: expected result {expected} but was {actual}. Console output:\n{console}")]
    OutcomeMismatch {
        build: String,
        expected: Outcome,
        actual: Outcome,
        console: String,
    },

    #[error("{build}: console output {expectation} /{pattern}/. Console output:\n{console}")]
    ConsoleMismatch {
        build: String,
        expectation: &'static str,
        pattern: String,
        console: String,
    },

    #[error("Existence check failed for {url}: {reason}")]
    Existence { url: String, reason: String },

    #[error("Invalid console pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Unknown view kind '{0}' (expected base, artifacts or changes)")]
    UnknownViewKind(String),

    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Configuration error: {0}")]
    Config(ciprobe_common::Error),
}

impl E2eError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, E2eError::NotFound { .. })
    }

    /// I/O or protocol failures that are not a plain "not found"
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            E2eError::Http(_) | E2eError::UnexpectedStatus { .. } | E2eError::MalformedDocument { .. }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, E2eError::Timeout { .. })
    }
}

impl From<ciprobe_common::Error> for E2eError {
    fn from(e: ciprobe_common::Error) -> Self {
        match e {
            ciprobe_common::Error::UnknownOutcome(value) => E2eError::UnknownOutcome(value),
            other => E2eError::Config(other),
        }
    }
}

impl From<url::ParseError> for E2eError {
    fn from(e: url::ParseError) -> Self {
        E2eError::InvalidLocation(e.to_string())
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
