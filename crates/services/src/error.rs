//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{DifficultyError, QuestionError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `QuestionSource`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionSourceError {
    #[error(transparent)]
    InvalidDifficulty(#[from] DifficultyError),
    #[error("question source unavailable: {0}")]
    Unavailable(#[from] StorageError),
    #[error("corpus entry {index} is malformed: {source}")]
    Malformed {
        index: usize,
        #[source]
        source: QuestionError,
    },
}

/// Errors emitted by session services.
///
/// Everything except `Source` and `Empty` is a rejected action: the session is
/// left exactly as it was.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    #[error("session already completed")]
    Completed,
    #[error("input is locked until the next question")]
    InputLocked,
    #[error("select an answer first")]
    NoSelection,
    #[error("{option:?} is not an option for this question")]
    UnknownOption { option: String },
    #[error("already at the first question")]
    NoPreviousQuestion,
    #[error("this is the last question; finish instead")]
    NoNextQuestion,
    #[error("questions remain; use next instead")]
    NotLastQuestion,
    #[error("no committed answer is waiting to advance")]
    NotLocked,
    #[error(transparent)]
    Source(#[from] QuestionSourceError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
