//! Question corpus compiled into the binary.

use async_trait::async_trait;
use quiz_core::model::Difficulty;
use serde::Deserialize;

use crate::repository::{QuestionBank, QuestionRecord, StorageError};

const EASY: &str = include_str!("../data/easy.json");
const MEDIUM: &str = include_str!("../data/medium.json");
const HARD: &str = include_str!("../data/hard.json");

/// Top-level shape of a corpus file; fields other than `results` are ignored.
#[derive(Debug, Deserialize)]
struct CorpusFile {
    results: Vec<QuestionRecord>,
}

/// The three static collections shipped with the app.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledQuestions;

impl BundledQuestions {
    /// Parse a corpus document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the document is not a corpus file.
    pub fn parse(raw: &str) -> Result<Vec<QuestionRecord>, StorageError> {
        serde_json::from_str::<CorpusFile>(raw)
            .map(|file| file.results)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    fn raw(difficulty: Difficulty) -> &'static str {
        match difficulty {
            Difficulty::Easy => EASY,
            Difficulty::Medium => MEDIUM,
            Difficulty::Hard => HARD,
        }
    }
}

#[async_trait]
impl QuestionBank for BundledQuestions {
    async fn questions(&self, difficulty: Difficulty) -> Result<Vec<QuestionRecord>, StorageError> {
        Self::parse(Self::raw(difficulty))
    }
}
