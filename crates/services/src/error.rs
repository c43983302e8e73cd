//! Shared error types for the services crate.

use thiserror::Error;

use intake_core::model::{AnswerError, ResponseKey};
use storage::repository::StorageError;

/// Errors from the adequacy classifier collaborator.
///
/// The session never propagates these; it fails open and turns them into a
/// notice.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClassifierError {
    #[error("answer review is not configured")]
    Disabled,
    #[error("answer review returned an empty response")]
    EmptyResponse,
    #[error("answer review timed out")]
    Timeout,
    #[error("answer review request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(reqwest::Error),
}

impl From<reqwest::Error> for ClassifierError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

/// Errors emitted by the session controller and questionnaire service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] AnswerError),
    #[error("unknown section: {0}")]
    UnknownSection(String),
    #[error("no section is active")]
    NoActiveSection,
    #[error("`{action}` is not available on the {screen} screen")]
    InvalidAction {
        action: &'static str,
        screen: &'static str,
    },
    #[error("no response recorded for {0}")]
    NoResponse(ResponseKey),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while writing the exported report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    #[error("failed to write report to {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
