use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("question seconds must be between 5 and 600")]
    InvalidQuestionSeconds,

    #[error("feedback delay must be at most 10000 ms")]
    InvalidFeedbackDelay,
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Timing knobs for a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSettings {
    question_seconds: u32,
    feedback_delay_ms: u64,
}

impl QuizSettings {
    pub const DEFAULT_QUESTION_SECONDS: u32 = 30;
    pub const DEFAULT_FEEDBACK_DELAY_MS: u64 = 700;

    /// # Errors
    ///
    /// Returns `SettingsError` if either value is out of range.
    pub fn new(question_seconds: u32, feedback_delay_ms: u64) -> Result<Self, SettingsError> {
        if !(5..=600).contains(&question_seconds) {
            return Err(SettingsError::InvalidQuestionSeconds);
        }
        if feedback_delay_ms > 10_000 {
            return Err(SettingsError::InvalidFeedbackDelay);
        }
        Ok(Self {
            question_seconds,
            feedback_delay_ms,
        })
    }

    /// Seconds on the countdown for each question.
    #[must_use]
    pub fn question_seconds(&self) -> u32 {
        self.question_seconds
    }

    #[must_use]
    pub fn feedback_delay_ms(&self) -> u64 {
        self.feedback_delay_ms
    }

    /// How long input stays locked after a commit.
    #[must_use]
    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            question_seconds: Self::DEFAULT_QUESTION_SECONDS,
            feedback_delay_ms: Self::DEFAULT_FEEDBACK_DELAY_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_timings() {
        let settings = QuizSettings::default();
        assert_eq!(settings.question_seconds(), 30);
        assert_eq!(settings.feedback_delay(), Duration::from_millis(700));
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            QuizSettings::new(4, 700).unwrap_err(),
            SettingsError::InvalidQuestionSeconds
        );
        assert_eq!(
            QuizSettings::new(30, 10_001).unwrap_err(),
            SettingsError::InvalidFeedbackDelay
        );
        assert!(QuizSettings::new(600, 0).is_ok());
    }
}
