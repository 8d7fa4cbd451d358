use std::sync::Arc;

use quiz_core::{Clock, Question};

use super::service::QuizSession;
use crate::error::{PersistenceError, SubmitError};
use crate::grader::GradingBackend;
use crate::question_store::QuestionStore;

/// Outcome of driving one submit request through the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The grading call completed and its result landed in the session.
    Applied,
    /// The session was reset or replaced while the call was outstanding;
    /// the response was discarded.
    Discarded,
    /// Nothing was sent because a submission is already in flight.
    AlreadySubmitting,
}

/// Orchestrates quiz sessions around their asynchronous collaborators.
///
/// The session itself is synchronous; this service owns the clock, the
/// grading backend, and the question store, and drives the one suspension
/// point (the grading call) per submission.
#[derive(Clone)]
pub struct QuizFlowService {
    clock: Clock,
    grader: Arc<dyn GradingBackend>,
    store: Arc<dyn QuestionStore>,
}

impl QuizFlowService {
    #[must_use]
    pub fn new(clock: Clock, grader: Arc<dyn GradingBackend>, store: Arc<dyn QuestionStore>) -> Self {
        Self {
            clock,
            grader,
            store,
        }
    }

    /// Build a fresh session for the supplied question set.
    ///
    /// An empty set is valid and renders as "no questions".
    #[must_use]
    pub fn start(&self, questions: Vec<Question>) -> QuizSession {
        QuizSession::new(questions, self.clock.now())
    }

    /// Swap in a new question set (the learner starts a different quiz).
    pub fn restart(&self, session: &mut QuizSession, questions: Vec<Question>) {
        session.replace_questions(questions, self.clock.now());
    }

    /// Reset the current round for another attempt.
    pub fn reset(&self, session: &mut QuizSession) {
        session.reset(self.clock.now());
    }

    /// Validate, submit, and grade the session's answers.
    ///
    /// Issues exactly one grading call per accepted submission and never
    /// retries it. A repeat submit while one is in flight is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError` for local validation failures; the session stays
    /// in `Answering` and no request is sent. Grading failures are not errors
    /// of this method — they land the session in `ResultError` for the
    /// learner to inspect and retry.
    pub async fn submit(&self, session: &mut QuizSession) -> Result<SubmitOutcome, SubmitError> {
        let Some(pending) = session.begin_submit()? else {
            return Ok(SubmitOutcome::AlreadySubmitting);
        };

        let outcome = self.grader.grade(&pending.batch).await;
        if session.apply_grading(pending.generation, outcome) {
            Ok(SubmitOutcome::Applied)
        } else {
            log::warn!(
                "discarding grading response for superseded round {}",
                pending.generation
            );
            Ok(SubmitOutcome::Discarded)
        }
    }

    /// Persist the session's original question set under the given identity.
    ///
    /// Side channel, valid in any phase: only the questions travel, never the
    /// answers, and a failure here is reported to the caller without touching
    /// the session's grading state.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` when the store rejects the request or the
    /// call fails.
    pub async fn save_questions(
        &self,
        session: &QuizSession,
        user_id: &str,
    ) -> Result<(), PersistenceError> {
        self.store
            .save_questions(user_id, session.questions())
            .await
            .inspect_err(|err| log::warn!("failed to save question set: {err}"))
    }
}
