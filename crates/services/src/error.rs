//! Shared error types for the services crate.

use thiserror::Error;

use lesson_core::model::{ExerciseKind, LessonSummaryError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the lesson collaborator client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonApiError {
    #[error("lesson API base url is not configured")]
    NotConfigured,
    #[error("invalid lesson API base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("lesson API request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by the lesson state machine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("lesson has no exercises")]
    Empty,
    #[error("lesson already finished")]
    Finished,
    #[error("answer already submitted for this step")]
    AlreadySubmitted,
    #[error("nothing to submit yet")]
    NoAnswer,
    #[error("operation does not apply to a {actual} exercise")]
    WrongKind { actual: ExerciseKind },
    #[error("{0:?} is not one of the exercise choices")]
    UnknownChoice(String),
    #[error(transparent)]
    Summary(#[from] LessonSummaryError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Api(#[from] LessonApiError),
}
