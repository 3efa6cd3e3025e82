/// Result of recording a finished session against the high-score ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreReport {
    pub score: u32,
    pub high_score: u32,
    pub is_new_high_score: bool,
}

impl ScoreReport {
    /// Compare `score` against the previously stored best.
    #[must_use]
    pub fn against(score: u32, previous_best: u32) -> Self {
        if score > previous_best {
            Self {
                score,
                high_score: score,
                is_new_high_score: true,
            }
        } else {
            Self {
                score,
                high_score: previous_best,
                is_new_high_score: false,
            }
        }
    }
}
