use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use quiz_core::model::{AnswerRecord, Difficulty, Question, QuizSettings, Transcript};

use super::progress::SessionProgress;
use super::view::SessionSnapshot;
use crate::error::SessionError;
use crate::timer::{CountdownTimer, TimerEvent, TimerEventKind, TimerHandle};

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Where a loaded session is in its lifecycle.
///
/// Loading and load failures happen before a `QuizSession` exists; see
/// `QuizLoopService::start_session`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for a selection, skip, navigation, or timeout.
    Active,
    /// An answer was just committed; input is rejected until `advance`.
    Locked,
    /// Every question has been committed.
    Complete,
}

/// What a timer event did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    /// The event came from a retired timer, or the session was not active.
    Ignored,
    Ticked { remaining: u32 },
    /// The current question was committed by the countdown.
    TimedOut,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// State machine for one pass through a question set.
///
/// Exactly one countdown is live while the session is `Active`; it is cancelled
/// on every commit, on `previous`, and when the session is dropped.
pub struct QuizSession {
    difficulty: Difficulty,
    questions: Vec<Question>,
    current: usize,
    transcript: Transcript,
    active_selection: Option<String>,
    phase: SessionPhase,
    question_seconds: u32,
    seconds_remaining: u32,
    timer: Arc<dyn CountdownTimer>,
    active_timer: Option<TimerHandle>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Enter the first question and start its countdown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if `questions` is empty.
    pub fn start(
        difficulty: Difficulty,
        questions: Vec<Question>,
        settings: &QuizSettings,
        timer: Arc<dyn CountdownTimer>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        let mut session = Self {
            difficulty,
            questions,
            current: 0,
            transcript: Transcript::new(),
            active_selection: None,
            phase: SessionPhase::Active,
            question_seconds: settings.question_seconds(),
            seconds_remaining: settings.question_seconds(),
            timer,
            active_timer: None,
            started_at,
            completed_at: None,
        };
        session.restart_timer();
        tracing::debug!(%difficulty, total = session.questions.len(), "session started");
        Ok(session)
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Complete
    }

    #[must_use]
    pub fn is_input_locked(&self) -> bool {
        self.phase == SessionPhase::Locked
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Index of the question on screen; equals the question count once complete.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// True when the current question is the last one.
    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    #[must_use]
    pub fn active_selection(&self) -> Option<&str> {
        self.active_selection.as_deref()
    }

    #[must_use]
    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[must_use]
    pub fn last_record(&self) -> Option<&AnswerRecord> {
        self.transcript.last()
    }

    /// Handle of the countdown for the current question, if one is running.
    #[must_use]
    pub fn timer_handle(&self) -> Option<TimerHandle> {
        self.active_timer
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            current: (self.current + 1).min(self.questions.len()),
            total: self.questions.len(),
            answered: self.transcript.len(),
            is_complete: self.is_complete(),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self)
    }

    /// Highlight `option` for the current question. Repeated calls replace it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InputLocked` / `SessionError::Completed` outside
    /// `Active`, and `SessionError::UnknownOption` if `option` is not offered.
    pub fn select(&mut self, option: &str) -> Result<(), SessionError> {
        self.ensure_active()?;
        let offered = self
            .current_question()
            .is_some_and(|question| question.has_option(option));
        if !offered {
            return Err(SessionError::UnknownOption {
                option: option.to_owned(),
            });
        }
        self.active_selection = Some(option.to_owned());
        Ok(())
    }

    /// Commit the selection and move on; not available on the last question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoNextQuestion` on the last question and
    /// `SessionError::NoSelection` if nothing is selected.
    pub fn next(&mut self) -> Result<&AnswerRecord, SessionError> {
        self.ensure_active()?;
        if self.is_last_question() {
            return Err(SessionError::NoNextQuestion);
        }
        self.commit_selection()
    }

    /// Commit the selection on the last question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotLastQuestion` before the last question and
    /// `SessionError::NoSelection` if nothing is selected.
    pub fn finish(&mut self) -> Result<&AnswerRecord, SessionError> {
        self.ensure_active()?;
        if !self.is_last_question() {
            return Err(SessionError::NotLastQuestion);
        }
        self.commit_selection()
    }

    /// Commit the current question with no answer, ignoring any selection.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InputLocked` / `SessionError::Completed` outside `Active`.
    pub fn skip(&mut self) -> Result<&AnswerRecord, SessionError> {
        self.ensure_active()?;
        self.commit(None, false)
    }

    /// Apply a countdown event.
    ///
    /// Events from any timer other than the current question's are dropped.
    pub fn handle_timer(&mut self, event: TimerEvent) -> TimerOutcome {
        if self.phase != SessionPhase::Active || self.active_timer != Some(event.handle) {
            tracing::debug!(handle = event.handle.value(), "dropping stale timer event");
            return TimerOutcome::Ignored;
        }

        match event.kind {
            TimerEventKind::Tick { remaining } => {
                self.seconds_remaining = remaining;
                TimerOutcome::Ticked { remaining }
            }
            TimerEventKind::Timeout => {
                self.seconds_remaining = 0;
                let selection = self.active_selection.clone();
                if let Err(err) = self.commit(selection, true) {
                    tracing::warn!(error = %err, "timeout could not commit the current question");
                    return TimerOutcome::Ignored;
                }
                TimerOutcome::TimedOut
            }
        }
    }

    /// End the feedback window: enter the next question or complete.
    ///
    /// `now` stamps completion.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotLocked` unless an answer was just committed.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<SessionPhase, SessionError> {
        match self.phase {
            SessionPhase::Locked => {}
            SessionPhase::Active => return Err(SessionError::NotLocked),
            SessionPhase::Complete => return Err(SessionError::Completed),
        }

        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.active_selection = None;
            self.phase = SessionPhase::Active;
            self.restart_timer();
        } else {
            self.current = self.questions.len();
            self.active_selection = None;
            self.phase = SessionPhase::Complete;
            self.completed_at = Some(now);
            tracing::debug!(
                difficulty = %self.difficulty,
                score = self.transcript.score(),
                "session complete"
            );
        }
        Ok(self.phase)
    }

    /// Step back one question, discarding its committed answer.
    ///
    /// The earlier question is re-entered fresh: no selection, full countdown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoPreviousQuestion` on the first question, and
    /// `SessionError::InputLocked` / `SessionError::Completed` outside `Active`.
    pub fn previous(&mut self) -> Result<(), SessionError> {
        self.ensure_active()?;
        if self.current == 0 {
            return Err(SessionError::NoPreviousQuestion);
        }
        self.current -= 1;
        self.transcript.pop();
        self.active_selection = None;
        self.restart_timer();
        Ok(())
    }

    /// Stop the countdown. Called on teardown; dropping the session does the same.
    pub fn abandon(&mut self) {
        self.cancel_timer();
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Active => Ok(()),
            SessionPhase::Locked => Err(SessionError::InputLocked),
            SessionPhase::Complete => Err(SessionError::Completed),
        }
    }

    fn commit_selection(&mut self) -> Result<&AnswerRecord, SessionError> {
        let selection = self.active_selection.clone().ok_or(SessionError::NoSelection)?;
        self.commit(Some(selection), false)
    }

    fn commit(
        &mut self,
        selection: Option<String>,
        expired: bool,
    ) -> Result<&AnswerRecord, SessionError> {
        let question = self.current_question().ok_or(SessionError::Completed)?;
        let record = AnswerRecord::commit(question, selection, expired);
        self.cancel_timer();
        tracing::debug!(
            index = self.current,
            correct = record.is_correct(),
            timed_out = record.timed_out(),
            "answer committed"
        );
        self.transcript.push(record);
        self.phase = SessionPhase::Locked;
        self.transcript.last().ok_or(SessionError::Completed)
    }

    fn restart_timer(&mut self) {
        self.cancel_timer();
        self.seconds_remaining = self.question_seconds;
        self.active_timer = Some(self.timer.start(self.question_seconds));
    }

    fn cancel_timer(&mut self) {
        if let Some(handle) = self.active_timer.take() {
            self.timer.cancel(handle);
        }
    }
}

impl Drop for QuizSession {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("difficulty", &self.difficulty)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("transcript_len", &self.transcript.len())
            .field("phase", &self.phase)
            .field("active_timer", &self.active_timer)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
