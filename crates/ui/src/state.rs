use services::{QuestionSourceError, SessionError};
use thiserror::Error;

/// User-facing failures. Messages are shown as-is.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ViewError {
    #[error("\"{raw}\" is not a difficulty. Choose easy, medium, or hard.")]
    InvalidDifficulty { raw: String },
    #[error("Questions could not be loaded. Please try again later.")]
    QuestionsUnavailable,
    #[error("There are no questions for this difficulty yet.")]
    EmptyQuiz,
    #[error("Something went wrong. Please try again.")]
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<&SessionError> for ViewError {
    fn from(err: &SessionError) -> Self {
        match err {
            SessionError::Empty => ViewError::EmptyQuiz,
            SessionError::Source(source) => ViewError::from(source),
            _ => ViewError::Unknown,
        }
    }
}

impl From<&QuestionSourceError> for ViewError {
    fn from(err: &QuestionSourceError) -> Self {
        match err {
            QuestionSourceError::InvalidDifficulty(quiz_core::model::DifficultyError::Unknown {
                raw,
            }) => ViewError::InvalidDifficulty {
                raw: raw.trim().to_owned(),
            },
            QuestionSourceError::Unavailable(_) | QuestionSourceError::Malformed { .. } => {
                ViewError::QuestionsUnavailable
            }
            _ => ViewError::Unknown,
        }
    }
}
