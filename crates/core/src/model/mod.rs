mod answer;
mod difficulty;
mod question;
mod score;
mod settings;

pub use answer::{AnswerRecord, Transcript};
pub use difficulty::{Difficulty, DifficultyError};
pub use question::{Question, QuestionError};
pub use score::ScoreReport;
pub use settings::{QuizSettings, SettingsError};
