use rand::Rng;
use std::sync::Arc;

use quiz_core::model::{Difficulty, Question};
use storage::repository::{QuestionBank, QuestionRecord};

use crate::error::QuestionSourceError;

/// In-place Fisher–Yates shuffle.
///
/// Walks from the last index down to 1, swapping each slot with a uniformly
/// drawn index in `[0, i]`, so every permutation is equally likely.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Turn a corpus entry into a `Question` with shuffled options.
///
/// Options are the incorrect answers followed by the correct one, then shuffled.
///
/// # Errors
///
/// Returns `QuestionError` if the entry does not make a valid question.
pub fn build_question<R: Rng + ?Sized>(
    record: QuestionRecord,
    rng: &mut R,
) -> Result<Question, quiz_core::model::QuestionError> {
    let QuestionRecord {
        question,
        correct_answer,
        incorrect_answers,
    } = record;
    let mut options = incorrect_answers;
    options.push(correct_answer.clone());
    shuffle(&mut options, rng);
    Question::new(question, correct_answer, options)
}

/// Supplies shuffled question sequences per difficulty tier.
#[derive(Clone)]
pub struct QuestionSource {
    bank: Arc<dyn QuestionBank>,
}

impl QuestionSource {
    #[must_use]
    pub fn new(bank: Arc<dyn QuestionBank>) -> Self {
        Self { bank }
    }

    /// Load the tier's questions in corpus order, each with freshly shuffled options.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError::Unavailable` if the corpus cannot be read and
    /// `QuestionSourceError::Malformed` if an entry is not a valid question.
    pub async fn load(&self, difficulty: Difficulty) -> Result<Vec<Question>, QuestionSourceError> {
        let records = self.bank.questions(difficulty).await?;
        let mut rng = rand::rng();
        let questions = build_all(records, &mut rng)?;
        tracing::debug!(%difficulty, count = questions.len(), "loaded questions");
        Ok(questions)
    }

    /// Same as `load`, with a caller-supplied RNG.
    ///
    /// # Errors
    ///
    /// See `load`.
    pub async fn load_with_rng<R: Rng + Send + ?Sized>(
        &self,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Result<Vec<Question>, QuestionSourceError> {
        let records = self.bank.questions(difficulty).await?;
        build_all(records, rng)
    }

    /// Parse a tier name and load it.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError::InvalidDifficulty` for an unrecognized tier,
    /// otherwise see `load`.
    pub async fn load_named(&self, raw: &str) -> Result<Vec<Question>, QuestionSourceError> {
        let difficulty = raw.parse::<Difficulty>()?;
        self.load(difficulty).await
    }

    /// Number of questions a session for this tier would contain.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError::Unavailable` if the corpus cannot be read.
    pub async fn count(&self, difficulty: Difficulty) -> Result<usize, QuestionSourceError> {
        Ok(self.bank.count(difficulty).await?)
    }
}

fn build_all<R: Rng + ?Sized>(
    records: Vec<QuestionRecord>,
    rng: &mut R,
) -> Result<Vec<Question>, QuestionSourceError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            build_question(record, rng)
                .map_err(|source| QuestionSourceError::Malformed { index, source })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::DifficultyError;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use storage::BundledQuestions;
    use storage::repository::InMemoryRepository;

    fn record(question: &str, correct: &str, incorrect: &[&str]) -> QuestionRecord {
        QuestionRecord::new(
            question,
            correct,
            incorrect.iter().map(|s| (*s).to_owned()).collect(),
        )
    }

    fn source_with(difficulty: Difficulty, records: Vec<QuestionRecord>) -> QuestionSource {
        let repo = InMemoryRepository::new();
        repo.put_questions(difficulty, records).unwrap();
        QuestionSource::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn every_bundled_tier_loads_with_answer_present_once() {
        let source = QuestionSource::new(Arc::new(BundledQuestions));
        for tier in Difficulty::ALL {
            let questions = source.load(tier).await.unwrap();
            assert!(!questions.is_empty());
            for q in &questions {
                let hits = q
                    .options()
                    .iter()
                    .filter(|o| *o == q.correct_answer())
                    .count();
                assert_eq!(hits, 1, "{tier}: {}", q.prompt());
            }
        }
    }

    #[tokio::test]
    async fn unknown_tier_name_is_rejected() {
        let source = QuestionSource::new(Arc::new(BundledQuestions));
        let err = source.load_named("impossible").await.unwrap_err();
        assert!(matches!(
            err,
            QuestionSourceError::InvalidDifficulty(DifficultyError::Unknown { .. })
        ));
        assert!(source.load_named("medium").await.is_ok());
    }

    #[tokio::test]
    async fn missing_collection_is_unavailable() {
        let source = source_with(Difficulty::Easy, Vec::new());
        let err = source.load(Difficulty::Hard).await.unwrap_err();
        assert!(matches!(err, QuestionSourceError::Unavailable(_)));
    }

    #[tokio::test]
    async fn malformed_entry_reports_its_index() {
        let source = source_with(
            Difficulty::Easy,
            vec![
                record("ok", "A", &["B"]),
                record("dup", "A", &["A", "B"]),
            ],
        );
        let err = source.load(Difficulty::Easy).await.unwrap_err();
        assert!(matches!(err, QuestionSourceError::Malformed { index: 1, .. }));
    }

    #[tokio::test]
    async fn seeded_rng_is_reproducible() {
        let source = source_with(
            Difficulty::Medium,
            vec![record("Q", "A", &["B", "C", "D", "E"])],
        );
        let a = source
            .load_with_rng(Difficulty::Medium, &mut StdRng::seed_from_u64(7))
            .await
            .unwrap();
        let b = source
            .load_with_rng(Difficulty::Medium, &mut StdRng::seed_from_u64(7))
            .await
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn shuffle_keeps_every_element() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut items: Vec<u32> = (0..20).collect();
        shuffle(&mut items, &mut rng);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_handles_tiny_slices() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut empty: Vec<u8> = Vec::new();
        shuffle(&mut empty, &mut rng);
        let mut one = vec![9];
        shuffle(&mut one, &mut rng);
        assert_eq!(one, vec![9]);
    }

    #[test]
    fn correct_answer_position_is_uniform() {
        const TRIALS: usize = 40_000;
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut hits = [0_usize; 4];
        for _ in 0..TRIALS {
            let q = build_question(record("Q", "A", &["B", "C", "D"]), &mut rng).unwrap();
            let pos = q.options().iter().position(|o| o == "A").unwrap();
            hits[pos] += 1;
        }
        // Expected 10_000 per slot; 5 sigma is about 430.
        for (pos, count) in hits.iter().enumerate() {
            let diff = count.abs_diff(TRIALS / 4);
            assert!(diff < 600, "slot {pos} got {count} of {TRIALS}");
        }
    }

    #[test]
    fn every_permutation_of_three_appears_evenly() {
        const TRIALS: usize = 60_000;
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = std::collections::HashMap::new();
        for _ in 0..TRIALS {
            let mut items = ['a', 'b', 'c'];
            shuffle(&mut items, &mut rng);
            *counts.entry(items).or_insert(0_usize) += 1;
        }
        assert_eq!(counts.len(), 6);
        for (perm, count) in counts {
            assert!(count.abs_diff(TRIALS / 6) < 600, "{perm:?} got {count}");
        }
    }
}
