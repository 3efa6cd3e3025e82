use quiz_core::model::Difficulty;
use services::{QuizOutcome, SessionError, SessionSnapshot, SessionUpdate};

use crate::state::ViewError;
use crate::vm::time_fmt::format_countdown;

/// Seconds at or below which the countdown is flagged as urgent.
const URGENT_SECONDS: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionState {
    Idle,
    Selected,
    /// Feedback: the right answer.
    Correct,
    /// Feedback: the user's wrong pick.
    Incorrect,
    /// Feedback: neither picked nor correct.
    Dimmed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub label: String,
    pub state: OptionState,
}

/// What the quiz screen shows for one snapshot of the session.
#[derive(Clone, Debug, PartialEq)]
pub struct QuizVm {
    pub difficulty_label: String,
    pub question_number: usize,
    pub prompt: String,
    pub progress_label: String,
    pub progress_fraction: f32,
    pub timer_label: String,
    pub timer_urgent: bool,
    pub options: Vec<OptionVm>,
    pub feedback: Option<String>,
    pub input_locked: bool,
    pub can_previous: bool,
    pub can_next: bool,
    pub can_finish: bool,
    pub can_skip: bool,
    /// Why the last action was refused; cleared by the next change.
    pub notice: Option<String>,
}

impl QuizVm {
    #[must_use]
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        let feedback_record = snapshot.feedback();
        let selection = snapshot.active_selection.as_deref();

        let options = snapshot
            .options
            .iter()
            .map(|option| {
                let state = match feedback_record {
                    Some(record) if record.correct_answer() == option => OptionState::Correct,
                    Some(record) if record.selected_answer() == Some(option.as_str()) => {
                        OptionState::Incorrect
                    }
                    Some(_) => OptionState::Dimmed,
                    None if selection == Some(option.as_str()) => OptionState::Selected,
                    None => OptionState::Idle,
                };
                OptionVm {
                    label: option.clone(),
                    state,
                }
            })
            .collect();

        let feedback = feedback_record.map(|record| {
            if record.timed_out() {
                format!("Time's up! The answer was {}.", record.correct_answer())
            } else if record.is_correct() {
                "Correct!".to_string()
            } else {
                format!("Incorrect. The answer was {}.", record.correct_answer())
            }
        });

        let active = !snapshot.input_locked && !snapshot.progress.is_complete;
        let has_selection = selection.is_some();

        Self {
            difficulty_label: snapshot.difficulty.label().to_string(),
            question_number: snapshot.progress.current,
            prompt: snapshot.prompt.clone().unwrap_or_default(),
            progress_label: format!(
                "Question {} of {}",
                snapshot.progress.current, snapshot.progress.total
            ),
            progress_fraction: snapshot.progress.fraction(),
            timer_label: format_countdown(snapshot.seconds_remaining),
            timer_urgent: active && snapshot.seconds_remaining <= URGENT_SECONDS,
            options,
            feedback,
            input_locked: snapshot.input_locked,
            can_previous: active && snapshot.current_index > 0,
            can_next: active && has_selection && !snapshot.is_last_question,
            can_finish: active && has_selection && snapshot.is_last_question,
            can_skip: active,
            notice: None,
        }
    }

    /// Label of the 1-based option `number`, as typed by the user.
    #[must_use]
    pub fn option_label(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|index| self.options.get(index))
            .map(|option| option.label.as_str())
    }
}

/// Lifecycle of the quiz screen, folded from session updates.
#[derive(Clone, Debug, PartialEq)]
pub enum QuizScreen {
    Loading { difficulty: Difficulty },
    Failed(ViewError),
    Active(QuizVm),
    Finished,
}

impl QuizScreen {
    #[must_use]
    pub fn loading(difficulty: Difficulty) -> Self {
        QuizScreen::Loading { difficulty }
    }

    #[must_use]
    pub fn failed(err: &SessionError) -> Self {
        QuizScreen::Failed(ViewError::from(err))
    }

    #[must_use]
    pub fn vm(&self) -> Option<&QuizVm> {
        match self {
            QuizScreen::Active(vm) => Some(vm),
            _ => None,
        }
    }

    /// Apply one update. Returns the outcome once the session completes.
    pub fn apply(&mut self, update: &SessionUpdate) -> Option<QuizOutcome> {
        match update {
            SessionUpdate::Changed(snapshot) => {
                *self = QuizScreen::Active(QuizVm::from_snapshot(snapshot));
                None
            }
            SessionUpdate::Rejected { reason } => {
                if let QuizScreen::Active(vm) = self {
                    vm.notice = Some(reason.clone());
                }
                None
            }
            SessionUpdate::Completed(outcome) => {
                *self = QuizScreen::Finished;
                Some(outcome.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerRecord, Question};
    use services::{SessionPhase, SessionProgress};

    fn question() -> Question {
        Question::new("Capital of France?", "Paris", vec![
            "Lyon".into(),
            "Paris".into(),
            "Nice".into(),
        ])
        .unwrap()
    }

    fn snapshot(index: usize, total: usize) -> SessionSnapshot {
        let q = question();
        SessionSnapshot {
            difficulty: Difficulty::Easy,
            phase: SessionPhase::Active,
            current_index: index,
            progress: SessionProgress {
                current: index + 1,
                total,
                answered: index,
                is_complete: false,
            },
            prompt: Some(q.prompt().to_owned()),
            options: q.options().to_vec(),
            active_selection: None,
            input_locked: false,
            seconds_remaining: 30,
            is_last_question: index + 1 == total,
            last_record: None,
        }
    }

    fn locked(mut snap: SessionSnapshot, selection: Option<&str>, expired: bool) -> SessionSnapshot {
        snap.phase = SessionPhase::Locked;
        snap.input_locked = true;
        snap.active_selection = selection.map(ToOwned::to_owned);
        snap.last_record = Some(AnswerRecord::commit(
            &question(),
            selection.map(ToOwned::to_owned),
            expired,
        ));
        snap
    }

    fn states(vm: &QuizVm) -> Vec<OptionState> {
        vm.options.iter().map(|o| o.state).collect()
    }

    #[test]
    fn fresh_question_only_allows_skip() {
        let vm = QuizVm::from_snapshot(&snapshot(0, 3));

        assert_eq!(vm.prompt, "Capital of France?");
        assert_eq!(vm.progress_label, "Question 1 of 3");
        assert_eq!(vm.timer_label, "0:30");
        assert!(!vm.timer_urgent);
        assert_eq!(states(&vm), vec![OptionState::Idle; 3]);
        assert!(vm.can_skip);
        assert!(!vm.can_next);
        assert!(!vm.can_finish);
        assert!(!vm.can_previous);
        assert_eq!(vm.feedback, None);
    }

    #[test]
    fn selection_enables_next_or_finish() {
        let mut snap = snapshot(1, 3);
        snap.active_selection = Some("Nice".into());
        let vm = QuizVm::from_snapshot(&snap);
        assert_eq!(states(&vm), vec![
            OptionState::Idle,
            OptionState::Idle,
            OptionState::Selected
        ]);
        assert!(vm.can_next);
        assert!(!vm.can_finish);
        assert!(vm.can_previous);

        let mut snap = snapshot(2, 3);
        snap.active_selection = Some("Paris".into());
        let vm = QuizVm::from_snapshot(&snap);
        assert!(!vm.can_next);
        assert!(vm.can_finish);
    }

    #[test]
    fn wrong_answer_feedback_marks_both_options() {
        let vm = QuizVm::from_snapshot(&locked(snapshot(0, 3), Some("Lyon"), false));

        assert_eq!(states(&vm), vec![
            OptionState::Incorrect,
            OptionState::Correct,
            OptionState::Dimmed
        ]);
        assert_eq!(vm.feedback.as_deref(), Some("Incorrect. The answer was Paris."));
        assert!(vm.input_locked);
        assert!(!vm.can_skip && !vm.can_next && !vm.can_previous);
    }

    #[test]
    fn timeout_feedback_names_the_answer() {
        let vm = QuizVm::from_snapshot(&locked(snapshot(0, 3), None, true));
        assert_eq!(vm.feedback.as_deref(), Some("Time's up! The answer was Paris."));
        assert_eq!(states(&vm), vec![
            OptionState::Dimmed,
            OptionState::Correct,
            OptionState::Dimmed
        ]);

        let vm = QuizVm::from_snapshot(&locked(snapshot(0, 3), Some("Paris"), false));
        assert_eq!(vm.feedback.as_deref(), Some("Correct!"));
    }

    #[test]
    fn countdown_turns_urgent() {
        let mut snap = snapshot(0, 3);
        snap.seconds_remaining = 5;
        let vm = QuizVm::from_snapshot(&snap);
        assert!(vm.timer_urgent);
        assert_eq!(vm.timer_label, "0:05");
    }

    #[test]
    fn option_numbers_are_one_based() {
        let vm = QuizVm::from_snapshot(&snapshot(0, 3));
        assert_eq!(vm.option_label(1), Some("Lyon"));
        assert_eq!(vm.option_label(3), Some("Nice"));
        assert_eq!(vm.option_label(0), None);
        assert_eq!(vm.option_label(4), None);
    }

    #[test]
    fn screen_folds_updates() {
        let mut screen = QuizScreen::loading(Difficulty::Easy);
        assert_eq!(screen.vm(), None);

        screen.apply(&SessionUpdate::Changed(snapshot(0, 2)));
        screen.apply(&SessionUpdate::Rejected {
            reason: "select an answer first".into(),
        });
        assert_eq!(
            screen.vm().and_then(|vm| vm.notice.as_deref()),
            Some("select an answer first")
        );

        screen.apply(&SessionUpdate::Changed(snapshot(0, 2)));
        assert_eq!(screen.vm().and_then(|vm| vm.notice.as_deref()), None);
    }

    #[test]
    fn failed_start_shows_message() {
        let screen = QuizScreen::failed(&SessionError::Empty);
        assert_eq!(screen, QuizScreen::Failed(ViewError::EmptyQuiz));
    }
}
