//! Shared error types for the services crate.

use thiserror::Error;

/// Local validation failures raised when a submission is requested.
///
/// These never reach the network; the session stays in `Answering`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubmitError {
    #[error("{missing} question(s) still unanswered")]
    Unanswered { missing: usize },
    #[error("no questions to submit")]
    NothingToSubmit,
}

/// Errors emitted by grading backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GradingError {
    #[error("grading service responded with status {status}: {message}")]
    HttpStatus {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("grading response has no usable aggregate score")]
    Malformed { raw: String },
}

/// Errors emitted by the question persistence side channel.
///
/// Isolated by design: these are reported to the caller and never alter the
/// session's grading state.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PersistenceError {
    #[error("question store responded with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
