use std::sync::Arc;

use quiz_core::model::QuizSettings;
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::question_source::QuestionSource;
use crate::score_ledger::ScoreLedger;
use crate::sessions::QuizLoopService;

/// Assembles app-facing services over a storage backend.
#[derive(Clone)]
pub struct AppServices {
    questions: Arc<QuestionSource>,
    scores: Arc<ScoreLedger>,
    quiz_loop: Arc<QuizLoopService>,
}

impl AppServices {
    /// Build services with high scores persisted in `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        settings: QuizSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, settings))
    }

    /// Bundled questions with an in-memory high-score store.
    #[must_use]
    pub fn in_memory(clock: Clock, settings: QuizSettings) -> Self {
        Self::from_storage(&Storage::bundled_in_memory(), clock, settings)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, settings: QuizSettings) -> Self {
        let questions = Arc::new(QuestionSource::new(Arc::clone(&storage.questions)));
        let scores = Arc::new(ScoreLedger::new(Arc::clone(&storage.kv)));
        let quiz_loop = Arc::new(QuizLoopService::new(
            clock,
            settings,
            Arc::clone(&questions),
            Arc::clone(&scores),
        ));

        Self {
            questions,
            scores,
            quiz_loop,
        }
    }

    #[must_use]
    pub fn questions(&self) -> Arc<QuestionSource> {
        Arc::clone(&self.questions)
    }

    #[must_use]
    pub fn scores(&self) -> Arc<ScoreLedger> {
        Arc::clone(&self.scores)
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }
}
