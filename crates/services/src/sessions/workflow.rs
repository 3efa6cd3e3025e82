use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;

use quiz_core::model::{Difficulty, QuizSettings, ScoreReport, Transcript};

use super::service::{QuizSession, SessionPhase, TimerOutcome};
use super::view::SessionSnapshot;
use crate::Clock;
use crate::error::SessionError;
use crate::question_source::QuestionSource;
use crate::score_ledger::ScoreLedger;
use crate::timer::{CountdownTimer, TokioCountdown};

/// Everything the results screen needs from a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOutcome {
    pub difficulty: Difficulty,
    pub transcript: Transcript,
    pub report: ScoreReport,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// User actions accepted by a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Select(String),
    Next,
    Finish,
    Skip,
    Previous,
    /// Leave the quiz screen; the session is torn down.
    Quit,
}

/// Notifications published while a session runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    Changed(SessionSnapshot),
    Rejected { reason: String },
    Completed(QuizOutcome),
}

/// How `run` ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(QuizOutcome),
    Abandoned { transcript: Transcript },
}

/// Orchestrates session start, the feedback window, and scoring.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    settings: QuizSettings,
    source: Arc<QuestionSource>,
    ledger: Arc<ScoreLedger>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: QuizSettings,
        source: Arc<QuestionSource>,
        ledger: Arc<ScoreLedger>,
    ) -> Self {
        Self {
            clock,
            settings,
            source,
            ledger,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    /// Load questions for `difficulty` and enter the first one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Source` if loading fails and `SessionError::Empty`
    /// if the tier has no questions.
    pub async fn start_session(
        &self,
        difficulty: Difficulty,
        timer: Arc<dyn CountdownTimer>,
    ) -> Result<QuizSession, SessionError> {
        let questions = self.source.load(difficulty).await?;
        QuizSession::start(difficulty, questions, &self.settings, timer, self.clock.now())
    }

    /// Like `start_session`, for a tier name handed over by the selection screen.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Source` wrapping `InvalidDifficulty` for unknown
    /// names, otherwise as `start_session`.
    pub async fn start_session_named(
        &self,
        raw: &str,
        timer: Arc<dyn CountdownTimer>,
    ) -> Result<QuizSession, SessionError> {
        let difficulty = raw
            .parse::<Difficulty>()
            .map_err(crate::error::QuestionSourceError::from)?;
        self.start_session(difficulty, timer).await
    }

    /// Close the feedback window. Scores the session if that was the last question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotLocked` / `SessionError::Completed` if there is
    /// no committed answer waiting.
    pub async fn advance(
        &self,
        session: &mut QuizSession,
    ) -> Result<Option<QuizOutcome>, SessionError> {
        match session.advance(self.clock.now())? {
            SessionPhase::Complete => self.finalize(session).await.map(Some),
            SessionPhase::Active | SessionPhase::Locked => Ok(None),
        }
    }

    /// Score a completed session against the ledger.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotLocked` if the session is still running.
    pub async fn finalize(&self, session: &QuizSession) -> Result<QuizOutcome, SessionError> {
        let Some(completed_at) = session.completed_at() else {
            return Err(SessionError::NotLocked);
        };
        let transcript = session.transcript().clone();
        let report = self.ledger.record(&transcript, session.difficulty()).await;
        Ok(QuizOutcome {
            difficulty: session.difficulty(),
            transcript,
            report,
            started_at: session.started_at(),
            completed_at,
        })
    }

    /// Drive a whole session from `commands` with a real countdown.
    ///
    /// Every state change is published on `updates`. Commands that arrive while
    /// input is locked are rejected, not queued. The session is abandoned when
    /// `commands` closes or yields `Quit`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` only if the session cannot be started.
    pub async fn run(
        &self,
        difficulty: Difficulty,
        mut commands: mpsc::Receiver<SessionCommand>,
        updates: mpsc::UnboundedSender<SessionUpdate>,
    ) -> Result<RunOutcome, SessionError> {
        let (timer, mut timer_events) = TokioCountdown::new();
        let timer: Arc<dyn CountdownTimer> = Arc::new(timer);
        let mut session = self.start_session(difficulty, Arc::clone(&timer)).await?;
        publish(&updates, SessionUpdate::Changed(session.snapshot()));

        loop {
            if session.is_input_locked() {
                let window = tokio::time::sleep(self.settings.feedback_delay());
                tokio::pin!(window);
                loop {
                    tokio::select! {
                        () = &mut window => break,
                        command = commands.recv() => match command {
                            None | Some(SessionCommand::Quit) => return Ok(abandon(session)),
                            Some(_) => publish(&updates, SessionUpdate::Rejected {
                                reason: SessionError::InputLocked.to_string(),
                            }),
                        },
                        Some(event) = timer_events.recv() => {
                            session.handle_timer(event);
                        }
                    }
                }

                if let Some(outcome) = self.advance(&mut session).await? {
                    publish(&updates, SessionUpdate::Completed(outcome.clone()));
                    return Ok(RunOutcome::Completed(outcome));
                }
                publish(&updates, SessionUpdate::Changed(session.snapshot()));
                continue;
            }

            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else {
                        return Ok(abandon(session));
                    };
                    if command == SessionCommand::Quit {
                        return Ok(abandon(session));
                    }
                    match apply(&mut session, command) {
                        Ok(()) => publish(&updates, SessionUpdate::Changed(session.snapshot())),
                        Err(err) => publish(&updates, SessionUpdate::Rejected {
                            reason: err.to_string(),
                        }),
                    }
                }
                Some(event) = timer_events.recv() => {
                    if session.handle_timer(event) != TimerOutcome::Ignored {
                        publish(&updates, SessionUpdate::Changed(session.snapshot()));
                    }
                }
            }
        }
    }
}

fn apply(session: &mut QuizSession, command: SessionCommand) -> Result<(), SessionError> {
    match command {
        SessionCommand::Select(option) => session.select(&option),
        SessionCommand::Next => session.next().map(|_| ()),
        SessionCommand::Finish => session.finish().map(|_| ()),
        SessionCommand::Skip => session.skip().map(|_| ()),
        SessionCommand::Previous => session.previous(),
        SessionCommand::Quit => Ok(()),
    }
}

fn abandon(mut session: QuizSession) -> RunOutcome {
    session.abandon();
    tracing::debug!(
        difficulty = %session.difficulty(),
        answered = session.transcript().len(),
        "session abandoned"
    );
    RunOutcome::Abandoned {
        transcript: session.transcript().clone(),
    }
}

fn publish(updates: &mpsc::UnboundedSender<SessionUpdate>, update: SessionUpdate) {
    // A closed receiver just means nobody is watching.
    let _ = updates.send(update);
}
