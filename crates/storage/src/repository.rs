use async_trait::async_trait;
use quiz_core::model::Difficulty;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::bundled::BundledQuestions;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Raw corpus entry, in the shape the bundled JSON files use.
///
/// Options are not shuffled here; the question source does that when it
/// turns records into `Question`s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
}

impl QuestionRecord {
    #[must_use]
    pub fn new(
        question: impl Into<String>,
        correct_answer: impl Into<String>,
        incorrect_answers: Vec<String>,
    ) -> Self {
        Self {
            question: question.into(),
            correct_answer: correct_answer.into(),
            incorrect_answers,
        }
    }
}

/// Read-only access to the question corpus.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Fetch every corpus entry for a tier, in corpus order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the tier has no collection, or other
    /// storage errors if the collection cannot be read.
    async fn questions(&self, difficulty: Difficulty) -> Result<Vec<QuestionRecord>, StorageError>;

    /// Number of entries available for a tier.
    ///
    /// # Errors
    ///
    /// Same as `questions`.
    async fn count(&self, difficulty: Difficulty) -> Result<usize, StorageError> {
        Ok(self.questions(difficulty).await?.len())
    }
}

/// Flat string key-value store, the persistence port for high scores.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<HashMap<Difficulty, Vec<QuestionRecord>>>>,
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the collection for a tier.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn put_questions(
        &self,
        difficulty: Difficulty,
        records: Vec<QuestionRecord>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(difficulty, records);
        Ok(())
    }
}

#[async_trait]
impl QuestionBank for InMemoryRepository {
    async fn questions(&self, difficulty: Difficulty) -> Result<Vec<QuestionRecord>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&difficulty).cloned().ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl KeyValueStore for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Aggregates the corpus and the key-value store behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionBank>,
    pub kv: Arc<dyn KeyValueStore>,
}

impl Storage {
    /// Bundled corpus with an in-memory store; high scores last for the process only.
    #[must_use]
    pub fn bundled_in_memory() -> Self {
        let kv: Arc<dyn KeyValueStore> = Arc::new(InMemoryRepository::new());
        Self {
            questions: Arc::new(BundledQuestions),
            kv,
        }
    }
}
