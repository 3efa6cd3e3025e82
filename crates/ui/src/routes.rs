use quiz_core::model::Difficulty;
use services::QuizOutcome;

/// The four screens and the data handed to each.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Difficulty,
    Quiz { difficulty: Difficulty },
    /// `None` when results are opened without finishing a quiz.
    Results { outcome: Option<Box<QuizOutcome>> },
}

/// Screen flow: home -> difficulty -> quiz -> results -> (restart | home).
///
/// Handoffs are one-shot: the difficulty travels with `Route::Quiz`, and the
/// outcome with `Route::Results`. Nothing else is shared between screens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigator {
    current: Route,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: Route::Home,
        }
    }

    /// Start directly on the quiz, skipping selection.
    #[must_use]
    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self {
            current: Route::Quiz { difficulty },
        }
    }

    #[must_use]
    pub fn current(&self) -> &Route {
        &self.current
    }

    /// Home -> difficulty selection.
    pub fn start(&mut self) -> &Route {
        self.go(Route::Difficulty)
    }

    /// Selection -> quiz for `difficulty`.
    pub fn choose(&mut self, difficulty: Difficulty) -> &Route {
        self.go(Route::Quiz { difficulty })
    }

    /// Quiz -> results.
    pub fn finish(&mut self, outcome: QuizOutcome) -> &Route {
        self.go(Route::Results {
            outcome: Some(Box::new(outcome)),
        })
    }

    /// Open results without an outcome, e.g. from a stale link.
    pub fn results_without_outcome(&mut self) -> &Route {
        self.go(Route::Results { outcome: None })
    }

    /// Results -> quiz with the same difficulty. Without an outcome there is no
    /// difficulty to reuse, so selection is shown instead.
    pub fn restart(&mut self) -> &Route {
        let next = match &self.current {
            Route::Results {
                outcome: Some(outcome),
            } => Route::Quiz {
                difficulty: outcome.difficulty,
            },
            Route::Quiz { difficulty } => Route::Quiz {
                difficulty: *difficulty,
            },
            Route::Home | Route::Difficulty | Route::Results { outcome: None } => {
                Route::Difficulty
            }
        };
        self.go(next)
    }

    /// Any screen -> home. Leaving the quiz this way abandons the session.
    pub fn home(&mut self) -> &Route {
        self.go(Route::Home)
    }

    fn go(&mut self, route: Route) -> &Route {
        self.current = route;
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{ScoreReport, Transcript};
    use quiz_core::time::fixed_now;

    fn outcome(difficulty: Difficulty) -> QuizOutcome {
        QuizOutcome {
            difficulty,
            transcript: Transcript::new(),
            report: ScoreReport::against(0, 0),
            started_at: fixed_now(),
            completed_at: fixed_now(),
        }
    }

    #[test]
    fn walks_the_happy_path() {
        let mut nav = Navigator::new();
        assert_eq!(nav.current(), &Route::Home);
        assert_eq!(nav.start(), &Route::Difficulty);
        assert_eq!(nav.choose(Difficulty::Medium), &Route::Quiz {
            difficulty: Difficulty::Medium
        });

        nav.finish(outcome(Difficulty::Medium));
        assert!(matches!(
            nav.current(),
            Route::Results { outcome: Some(o) } if o.difficulty == Difficulty::Medium
        ));
        assert_eq!(nav.home(), &Route::Home);
    }

    #[test]
    fn restart_reuses_the_finished_difficulty() {
        let mut nav = Navigator::with_difficulty(Difficulty::Hard);
        nav.finish(outcome(Difficulty::Hard));
        assert_eq!(nav.restart(), &Route::Quiz {
            difficulty: Difficulty::Hard
        });
    }

    #[test]
    fn restart_without_outcome_goes_to_selection() {
        let mut nav = Navigator::new();
        nav.results_without_outcome();
        assert_eq!(nav.restart(), &Route::Difficulty);
    }
}
