use std::sync::Arc;

use quiz_core::model::{Difficulty, ScoreReport, Transcript};
use storage::repository::KeyValueStore;

/// Storage key holding the best score for `difficulty`.
#[must_use]
pub fn high_score_key(difficulty: Difficulty) -> String {
    format!("quiz_highscore_{}", difficulty.as_str())
}

/// Scores finished sessions and keeps the best score per tier.
///
/// Persistence failures never reach the caller: an unreadable store counts as
/// "no high score yet" and a failed write is only logged.
#[derive(Clone)]
pub struct ScoreLedger {
    store: Arc<dyn KeyValueStore>,
}

impl ScoreLedger {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Best recorded score for a tier, or 0.
    pub async fn high_score(&self, difficulty: Difficulty) -> u32 {
        let key = high_score_key(difficulty);
        match self.store.get(&key).await {
            Ok(Some(raw)) => parse_score(&key, &raw),
            Ok(None) => 0,
            Err(err) => {
                tracing::warn!(%key, error = %err, "high score unavailable");
                0
            }
        }
    }

    /// Score `transcript` and replace the stored best if it is strictly higher.
    pub async fn record(&self, transcript: &Transcript, difficulty: Difficulty) -> ScoreReport {
        let score = transcript.score();
        let previous = self.high_score(difficulty).await;
        let report = ScoreReport::against(score, previous);

        if report.is_new_high_score {
            let key = high_score_key(difficulty);
            if let Err(err) = self.store.set(&key, &score.to_string()).await {
                tracing::warn!(%key, error = %err, "failed to persist high score");
            } else {
                tracing::info!(%difficulty, score, previous, "new high score");
            }
        }

        report
    }
}

fn parse_score(key: &str, raw: &str) -> u32 {
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!(%key, value = raw, "ignoring malformed high score");
        0
    })
}
