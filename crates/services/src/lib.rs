#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod question_source;
pub mod score_ledger;
pub mod sessions;
pub mod timer;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, QuestionSourceError, SessionError};
pub use question_source::QuestionSource;
pub use score_ledger::{ScoreLedger, high_score_key};
pub use sessions::{
    QuizLoopService, QuizOutcome, QuizSession, RunOutcome, SessionCommand, SessionPhase,
    SessionProgress, SessionSnapshot, SessionUpdate, TimerOutcome,
};
pub use timer::{
    CountdownTimer, RecordingCountdown, TimerEvent, TimerEventKind, TimerHandle, TokioCountdown,
};
