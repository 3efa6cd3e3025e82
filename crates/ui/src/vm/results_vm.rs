use services::QuizOutcome;

use crate::vm::time_fmt::{format_datetime, format_elapsed};

pub const EMPTY_RESULTS_MESSAGE: &str = "No results yet. Take a quiz first!";
const NO_ANSWER: &str = "(no answer)";
const TIMEOUT_NOTE: &str = "Auto-locked due to timeout";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultRowVm {
    pub number: usize,
    pub prompt: String,
    pub your_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub note: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsSummaryVm {
    pub difficulty_label: String,
    pub score_label: String,
    pub high_score_label: String,
    pub is_new_high_score: bool,
    pub elapsed_label: String,
    pub completed_at_str: String,
    pub rows: Vec<ResultRowVm>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResultsVm {
    /// Reached without a finished quiz.
    Empty { message: &'static str },
    Ready(ResultsSummaryVm),
}

#[must_use]
pub fn map_results(outcome: Option<&QuizOutcome>) -> ResultsVm {
    let Some(outcome) = outcome.filter(|outcome| !outcome.transcript.is_empty()) else {
        return ResultsVm::Empty {
            message: EMPTY_RESULTS_MESSAGE,
        };
    };

    let rows = outcome
        .transcript
        .records()
        .iter()
        .enumerate()
        .map(|(index, record)| ResultRowVm {
            number: index + 1,
            prompt: record.prompt().to_string(),
            your_answer: record.selected_answer().unwrap_or(NO_ANSWER).to_string(),
            correct_answer: record.correct_answer().to_string(),
            is_correct: record.is_correct(),
            note: record.timed_out().then(|| TIMEOUT_NOTE.to_string()),
        })
        .collect();

    let report = &outcome.report;
    let total = outcome.transcript.len();
    let difficulty_label = outcome.difficulty.label();
    let high_score_label = if report.is_new_high_score {
        format!(
            "New high score ({difficulty_label}): {}/{total}!",
            report.high_score
        )
    } else {
        format!("High score ({difficulty_label}): {}/{total}", report.high_score)
    };

    ResultsVm::Ready(ResultsSummaryVm {
        difficulty_label: difficulty_label.to_string(),
        score_label: format!("{}/{total}", report.score),
        high_score_label,
        is_new_high_score: report.is_new_high_score,
        elapsed_label: format_elapsed(outcome.started_at, outcome.completed_at),
        completed_at_str: format_datetime(outcome.completed_at),
        rows,
    })
}
