use serde::{Deserialize, Serialize};

use crate::model::Question;

//
// ─── ANSWER RECORD ────────────────────────────────────────────────────────────
//

/// Outcome of a single committed question.
///
/// `is_correct` is always `selected_answer == Some(correct_answer)`, and
/// `timed_out` is only set when the timer expired with nothing selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    prompt: String,
    selected_answer: Option<String>,
    correct_answer: String,
    is_correct: bool,
    timed_out: bool,
}

impl AnswerRecord {
    /// Commit an answer for `question`.
    ///
    /// `expired` marks a commit triggered by the countdown; it only sticks when
    /// there was no selection.
    #[must_use]
    pub fn commit(question: &Question, selected_answer: Option<String>, expired: bool) -> Self {
        let is_correct = selected_answer
            .as_deref()
            .is_some_and(|answer| question.is_correct(answer));
        let timed_out = expired && selected_answer.is_none();
        Self {
            prompt: question.prompt().to_owned(),
            selected_answer,
            correct_answer: question.correct_answer().to_owned(),
            is_correct,
            timed_out,
        }
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn selected_answer(&self) -> Option<&str> {
        self.selected_answer.as_deref()
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }
}

//
// ─── TRANSCRIPT ───────────────────────────────────────────────────────────────
//

/// Ordered answer records for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    records: Vec<AnswerRecord>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> &[AnswerRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&AnswerRecord> {
        self.records.last()
    }

    /// Number of correct records.
    #[must_use]
    pub fn score(&self) -> u32 {
        let correct = self.records.iter().filter(|r| r.is_correct()).count();
        u32::try_from(correct).unwrap_or(u32::MAX)
    }

    pub fn push(&mut self, record: AnswerRecord) {
        self.records.push(record);
    }

    /// Removes the most recent record (used when stepping back a question).
    pub fn pop(&mut self) -> Option<AnswerRecord> {
        self.records.pop()
    }
}

impl FromIterator<AnswerRecord> for Transcript {
    fn from_iter<I: IntoIterator<Item = AnswerRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
