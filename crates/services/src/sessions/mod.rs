mod progress;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::SessionProgress;
pub use service::{QuizSession, SessionPhase, TimerOutcome};
pub use view::SessionSnapshot;
pub use workflow::{QuizLoopService, QuizOutcome, RunOutcome, SessionCommand, SessionUpdate};
