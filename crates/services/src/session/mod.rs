mod progress;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SubmitError;
pub use progress::SessionProgress;
pub use service::{Generation, PendingSubmission, QuizSession, SessionFailure, SessionPhase};
pub use view::{ResultItemView, ResultsView, SessionView};
pub use workflow::{QuizFlowService, SubmitOutcome};
