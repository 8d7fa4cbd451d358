#![forbid(unsafe_code)]

pub mod error;
pub mod grader;
pub mod question_store;
pub mod session;

pub use quiz_core::Clock;

pub use error::{GradingError, PersistenceError, SubmitError};
pub use grader::{ApiConfig, GradingBackend, HttpGrader};
pub use question_store::{HttpQuestionStore, QuestionStore};

pub use session::{
    QuizFlowService, QuizSession, SessionPhase, SessionProgress, SessionView, SubmitOutcome,
};
