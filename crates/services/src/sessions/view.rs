use quiz_core::model::{AnswerRecord, Difficulty};

use super::progress::SessionProgress;
use super::service::{QuizSession, SessionPhase};

/// Presentation-agnostic copy of what a view needs to draw the quiz screen.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings
/// - no styling decisions
///
/// `last_record` is the most recent commit; views should only treat it as
/// feedback for the current question while `input_locked` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub difficulty: Difficulty,
    pub phase: SessionPhase,
    pub current_index: usize,
    pub progress: SessionProgress,
    pub prompt: Option<String>,
    pub options: Vec<String>,
    pub active_selection: Option<String>,
    pub input_locked: bool,
    pub seconds_remaining: u32,
    pub is_last_question: bool,
    pub last_record: Option<AnswerRecord>,
}

impl SessionSnapshot {
    #[must_use]
    pub fn capture(session: &QuizSession) -> Self {
        let question = session.current_question();
        Self {
            difficulty: session.difficulty(),
            phase: session.phase(),
            current_index: session.current_index(),
            progress: session.progress(),
            prompt: question.map(|q| q.prompt().to_owned()),
            options: question.map(|q| q.options().to_vec()).unwrap_or_default(),
            active_selection: session.active_selection().map(ToOwned::to_owned),
            input_locked: session.is_input_locked(),
            seconds_remaining: session.seconds_remaining(),
            is_last_question: session.is_last_question(),
            last_record: session.last_record().cloned(),
        }
    }

    /// Feedback for the question on screen, present only while locked.
    #[must_use]
    pub fn feedback(&self) -> Option<&AnswerRecord> {
        if self.input_locked {
            self.last_record.as_ref()
        } else {
            None
        }
    }
}
