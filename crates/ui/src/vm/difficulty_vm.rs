use quiz_core::model::Difficulty;
use services::{QuestionSource, ScoreLedger};

/// One row on the difficulty-selection screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DifficultyOptionVm {
    pub difficulty: Difficulty,
    pub label: String,
    pub count_label: String,
    pub high_score_label: String,
    /// False when the tier could not be loaded or has no questions.
    pub available: bool,
}

/// `count` is `None` when the tier could not be read.
#[must_use]
pub fn map_difficulty_option(
    difficulty: Difficulty,
    count: Option<usize>,
    high_score: u32,
) -> DifficultyOptionVm {
    let count_label = match count {
        None => "Unavailable".to_string(),
        Some(1) => "1 question".to_string(),
        Some(n) => format!("{n} questions"),
    };

    let high_score_label = if high_score == 0 {
        "No high score yet".to_string()
    } else {
        format!("Best: {high_score}")
    };

    DifficultyOptionVm {
        difficulty,
        label: difficulty.label().to_string(),
        count_label,
        high_score_label,
        available: count.is_some_and(|n| n > 0),
    }
}

/// Build every tier's row. Lookup failures degrade the row instead of failing the screen.
pub async fn load_difficulty_options(
    source: &QuestionSource,
    ledger: &ScoreLedger,
) -> Vec<DifficultyOptionVm> {
    let mut options = Vec::with_capacity(Difficulty::ALL.len());
    for difficulty in Difficulty::ALL {
        let count = source.count(difficulty).await.ok();
        let high_score = ledger.high_score(difficulty).await;
        options.push(map_difficulty_option(difficulty, count, high_score));
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use storage::repository::{InMemoryRepository, KeyValueStore, QuestionRecord};

    #[test]
    fn labels_counts_and_scores() {
        let vm = map_difficulty_option(Difficulty::Medium, Some(10), 7);
        assert_eq!(vm.label, "Medium");
        assert_eq!(vm.count_label, "10 questions");
        assert_eq!(vm.high_score_label, "Best: 7");
        assert!(vm.available);

        let vm = map_difficulty_option(Difficulty::Easy, Some(1), 0);
        assert_eq!(vm.count_label, "1 question");
        assert_eq!(vm.high_score_label, "No high score yet");
    }

    #[test]
    fn unreadable_or_empty_tiers_are_unavailable() {
        let vm = map_difficulty_option(Difficulty::Hard, None, 3);
        assert_eq!(vm.count_label, "Unavailable");
        assert!(!vm.available);

        assert!(!map_difficulty_option(Difficulty::Hard, Some(0), 0).available);
    }

    #[tokio::test]
    async fn loads_rows_in_tier_order() {
        let repo = InMemoryRepository::new();
        repo.put_questions(Difficulty::Easy, vec![QuestionRecord::new(
            "Q",
            "A",
            vec!["B".into()],
        )])
        .unwrap();
        repo.set("quiz_highscore_easy", "1").await.unwrap();

        let source = QuestionSource::new(Arc::new(repo.clone()));
        let ledger = ScoreLedger::new(Arc::new(repo));
        let rows = load_difficulty_options(&source, &ledger).await;

        let tiers: Vec<_> = rows.iter().map(|row| row.difficulty).collect();
        assert_eq!(tiers, Difficulty::ALL.to_vec());
        assert_eq!(rows[0].count_label, "1 question");
        assert_eq!(rows[0].high_score_label, "Best: 1");
        assert!(!rows[1].available);
    }
}
