//! Presentation-agnostic screens for the quiz.
//!
//! Nothing here draws anything. `routes` decides which screen is showing and
//! carries the handoff between screens; `vm` turns service data into labels
//! and flags a front-end can render directly.

pub mod routes;
pub mod state;
pub mod vm;

pub use routes::{Navigator, Route};
pub use state::ViewError;
