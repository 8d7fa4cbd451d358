use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::{AnswerRecord, GradingReport, Question};

use super::progress::SessionProgress;
use crate::error::{GradingError, SubmitError};

//
// ─── PHASE & SUPPORT TYPES ─────────────────────────────────────────────────────
//

/// Lifecycle phase of a quiz session.
///
/// Exactly one phase is active at a time. `ResultReady` and `ResultError`
/// only exit via an explicit reset; there is no automatic retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// The learner is viewing questions and editing answers.
    Answering,
    /// One grading call is outstanding; input events are ignored.
    Submitting,
    /// A well-formed grading report arrived.
    ResultReady,
    /// Grading failed (transport or malformed response).
    ResultError,
}

/// Monotonic stamp identifying one round of the session.
///
/// Bumped on every reset or question-set replacement, so a grading response
/// that raced a restart can be recognized as stale and discarded.
pub type Generation = u64;

/// Why a round ended in `ResultError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFailure {
    pub message: String,
    /// Raw response body, retained when the service replied but the shape
    /// was unusable. Absent for transport failures.
    pub raw_response: Option<String>,
}

/// Everything needed to perform one grading call.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmission {
    pub generation: Generation,
    pub batch: Vec<AnswerRecord>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory state machine for one quiz-taking session.
///
/// Owns the ordered question list, the index-aligned answer buffer, the
/// cursor, and the current phase. All mutation goes through the operations
/// below; the presentation layer only reads projections and dispatches them.
///
/// An empty question list is a valid session; it renders as "no questions"
/// and refuses submission.
pub struct QuizSession {
    questions: Vec<Question>,
    answers: Vec<String>,
    current: usize,
    phase: SessionPhase,
    generation: Generation,
    report: Option<GradingReport>,
    failure: Option<SessionFailure>,
    started_at: DateTime<Utc>,
}

impl QuizSession {
    /// Create a session for the given question set.
    ///
    /// `started_at` should come from the services layer clock to keep time
    /// deterministic.
    #[must_use]
    pub fn new(questions: Vec<Question>, started_at: DateTime<Utc>) -> Self {
        let answers = vec![String::new(); questions.len()];
        Self {
            questions,
            answers,
            current: 0,
            phase: SessionPhase::Answering,
            generation: 0,
            report: None,
            failure: None,
            started_at,
        }
    }

    /// Swap in a new question set, fully restarting the round.
    ///
    /// Clears the answer buffer and any stored result or error, and bumps
    /// the generation so an in-flight grading response cannot land here.
    pub fn replace_questions(&mut self, questions: Vec<Question>, now: DateTime<Utc>) {
        self.answers = vec![String::new(); questions.len()];
        self.questions = questions;
        self.restart_round(now);
    }

    /// Return to `Answering` at the first question with a cleared buffer.
    ///
    /// Valid from any phase; this is the only way out of `ResultReady` and
    /// `ResultError`. A reset is a new attempt, not a resume.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.answers = vec![String::new(); self.questions.len()];
        self.restart_round(now);
    }

    fn restart_round(&mut self, now: DateTime<Utc>) {
        self.current = 0;
        self.phase = SessionPhase::Answering;
        self.generation += 1;
        self.report = None;
        self.failure = None;
        self.started_at = now;
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    #[must_use]
    pub fn report(&self) -> Option<&GradingReport> {
        self.report.as_ref()
    }

    #[must_use]
    pub fn failure(&self) -> Option<&SessionFailure> {
        self.failure.as_ref()
    }

    /// Progress through the question list while answering.
    ///
    /// The fraction is exactly `0.0` for an empty set, never NaN.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.questions.len();
        let position = if total == 0 { 0 } else { self.current + 1 };
        #[allow(clippy::cast_precision_loss)]
        let fraction = if total == 0 {
            0.0
        } else {
            position as f64 / total as f64
        };
        SessionProgress {
            total,
            position,
            fraction,
        }
    }

    //
    // ─── ANSWERING OPERATIONS ──────────────────────────────────────────────────
    //

    /// Replace the buffered answer at `index`.
    ///
    /// Only valid while `Answering`; out-of-bounds indices and calls in any
    /// other phase are ignored. Empty text is allowed here and validated at
    /// submit time.
    pub fn set_answer(&mut self, index: usize, text: impl Into<String>) {
        if self.phase != SessionPhase::Answering {
            return;
        }
        if let Some(slot) = self.answers.get_mut(index) {
            *slot = text.into();
        }
    }

    /// Move to the next question, clamped at the last one.
    ///
    /// Navigation never discards previously entered answers.
    pub fn go_next(&mut self) {
        if self.phase != SessionPhase::Answering {
            return;
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        }
    }

    /// Move to the previous question, clamped at the first one.
    pub fn go_previous(&mut self) {
        if self.phase != SessionPhase::Answering {
            return;
        }
        self.current = self.current.saturating_sub(1);
    }

    //
    // ─── SUBMISSION ────────────────────────────────────────────────────────────
    //

    /// Validate the buffer and enter `Submitting`.
    ///
    /// Returns the generation-stamped batch for exactly one grading call.
    /// Returns `Ok(None)` when the session is not in `Answering` — a repeat
    /// submit while one is in flight is ignored, never interleaved.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::NothingToSubmit` for an empty question set and
    /// `SubmitError::Unanswered` when any slot is empty after trimming; the
    /// phase stays `Answering` and no request may be sent.
    pub fn begin_submit(&mut self) -> Result<Option<PendingSubmission>, SubmitError> {
        if self.phase != SessionPhase::Answering {
            return Ok(None);
        }
        if self.questions.is_empty() {
            return Err(SubmitError::NothingToSubmit);
        }
        let missing = self
            .answers
            .iter()
            .filter(|answer| answer.trim().is_empty())
            .count();
        if missing > 0 {
            return Err(SubmitError::Unanswered { missing });
        }

        self.phase = SessionPhase::Submitting;
        let batch = self
            .questions
            .iter()
            .zip(&self.answers)
            .map(|(question, answer)| AnswerRecord {
                question: question.clone(),
                user_answer: answer.clone(),
            })
            .collect();
        Ok(Some(PendingSubmission {
            generation: self.generation,
            batch,
        }))
    }

    /// Land the outcome of the grading call issued for `generation`.
    ///
    /// Returns whether the outcome was applied. A response carrying a stale
    /// generation (the session was reset or its questions replaced while the
    /// call was outstanding) is discarded and the session is left untouched.
    pub fn apply_grading(
        &mut self,
        generation: Generation,
        outcome: Result<GradingReport, GradingError>,
    ) -> bool {
        if generation != self.generation || self.phase != SessionPhase::Submitting {
            return false;
        }

        match outcome {
            Ok(report) => {
                self.report = Some(report);
                self.failure = None;
                self.phase = SessionPhase::ResultReady;
            }
            Err(err) => {
                let message = err.to_string();
                let raw_response = match err {
                    GradingError::Malformed { raw } => Some(raw),
                    _ => None,
                };
                self.report = None;
                self.failure = Some(SessionFailure {
                    message,
                    raw_response,
                });
                self.phase = SessionPhase::ResultError;
            }
        }
        true
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("phase", &self.phase)
            .field("generation", &self.generation)
            .field("has_report", &self.report.is_some())
            .field("has_failure", &self.failure.is_some())
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;
    use quiz_core::{GradingSummary, QuestionKind};

    fn build_question(id: i64) -> Question {
        Question::new(id, format!("Q{id}"), QuestionKind::ShortAnswer, format!("A{id}"))
    }

    fn build_session(count: i64) -> QuizSession {
        let questions = (1..=count).map(build_question).collect();
        QuizSession::new(questions, fixed_now())
    }

    fn build_report(score: f64) -> GradingReport {
        let summary = GradingSummary::new(score, 1, 2, "ok").unwrap();
        GradingReport::new(summary, Vec::new())
    }

    #[test]
    fn new_session_starts_answering_at_first_question() {
        let session = build_session(3);

        assert_eq!(session.phase(), SessionPhase::Answering);
        assert_eq!(session.current_index(), 0);
        assert!(session.answers().iter().all(String::is_empty));

        let progress = session.progress();
        assert_eq!(progress.total, 3);
        assert_eq!(progress.position, 1);
        assert!((progress.fraction - 1.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_session_is_valid_with_zero_progress() {
        let session = build_session(0);

        assert!(session.current_question().is_none());
        let progress = session.progress();
        assert_eq!(progress.total, 0);
        assert_eq!(progress.position, 0);
        assert_eq!(progress.fraction, 0.0);
    }

    #[test]
    fn navigation_clamps_and_preserves_answers() {
        let mut session = build_session(2);
        session.set_answer(0, "first");

        session.go_previous();
        assert_eq!(session.current_index(), 0);

        session.go_next();
        session.go_next();
        session.go_next();
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.answer(0), Some("first"));
    }

    #[test]
    fn set_answer_ignores_out_of_bounds_index() {
        let mut session = build_session(1);
        session.set_answer(5, "lost");
        assert_eq!(session.answers(), &[String::new()]);
    }

    #[test]
    fn submit_with_blank_answer_is_rejected_in_place() {
        let mut session = build_session(2);
        session.set_answer(0, "answered");
        session.set_answer(1, "   ");

        let err = session.begin_submit().unwrap_err();
        assert_eq!(err, SubmitError::Unanswered { missing: 1 });
        assert_eq!(session.phase(), SessionPhase::Answering);
    }

    #[test]
    fn submit_with_empty_set_is_rejected() {
        let mut session = build_session(0);
        let err = session.begin_submit().unwrap_err();
        assert_eq!(err, SubmitError::NothingToSubmit);
        assert_eq!(session.phase(), SessionPhase::Answering);
    }

    #[test]
    fn submit_builds_index_aligned_batch() {
        let mut session = build_session(2);
        session.set_answer(0, "alpha");
        session.set_answer(1, "beta");

        let pending = session.begin_submit().unwrap().unwrap();
        assert_eq!(session.phase(), SessionPhase::Submitting);
        assert_eq!(pending.generation, session.generation());
        assert_eq!(pending.batch.len(), 2);
        assert_eq!(pending.batch[0].user_answer, "alpha");
        assert_eq!(pending.batch[1].question.prompt(), "Q2");
    }

    #[test]
    fn duplicate_submit_while_in_flight_is_a_no_op() {
        let mut session = build_session(1);
        session.set_answer(0, "x");
        let first = session.begin_submit().unwrap();
        assert!(first.is_some());

        let second = session.begin_submit().unwrap();
        assert!(second.is_none());
        assert_eq!(session.phase(), SessionPhase::Submitting);
    }

    #[test]
    fn input_events_are_ignored_while_submitting() {
        let mut session = build_session(2);
        session.set_answer(0, "a");
        session.set_answer(1, "b");
        session.begin_submit().unwrap();

        session.set_answer(0, "mutated");
        session.go_next();
        assert_eq!(session.answer(0), Some("a"));
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn well_formed_report_lands_in_result_ready() {
        let mut session = build_session(1);
        session.set_answer(0, "x");
        let pending = session.begin_submit().unwrap().unwrap();

        assert!(session.apply_grading(pending.generation, Ok(build_report(50.0))));
        assert_eq!(session.phase(), SessionPhase::ResultReady);
        assert_eq!(session.report().unwrap().summary().score_percentage(), 50.0);
        assert!(session.failure().is_none());
    }

    #[test]
    fn transport_failure_lands_in_result_error_without_report() {
        let mut session = build_session(1);
        session.set_answer(0, "x");
        let pending = session.begin_submit().unwrap().unwrap();

        let err = GradingError::HttpStatus {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".into(),
        };
        assert!(session.apply_grading(pending.generation, Err(err)));
        assert_eq!(session.phase(), SessionPhase::ResultError);
        assert!(session.report().is_none());

        let failure = session.failure().unwrap();
        assert!(!failure.message.is_empty());
        assert!(failure.raw_response.is_none());
    }

    #[test]
    fn malformed_response_retains_raw_payload() {
        let mut session = build_session(1);
        session.set_answer(0, "x");
        let pending = session.begin_submit().unwrap().unwrap();

        let err = GradingError::Malformed {
            raw: r#"{"unexpected":true}"#.into(),
        };
        assert!(session.apply_grading(pending.generation, Err(err)));

        let failure = session.failure().unwrap();
        assert_eq!(
            failure.raw_response.as_deref(),
            Some(r#"{"unexpected":true}"#)
        );
    }

    #[test]
    fn stale_generation_response_is_discarded() {
        let mut session = build_session(1);
        session.set_answer(0, "x");
        let pending = session.begin_submit().unwrap().unwrap();

        session.reset(fixed_now());
        assert!(!session.apply_grading(pending.generation, Ok(build_report(100.0))));
        assert_eq!(session.phase(), SessionPhase::Answering);
        assert!(session.report().is_none());
    }

    #[test]
    fn reset_clears_result_and_returns_to_answering() {
        let mut session = build_session(2);
        session.set_answer(0, "a");
        session.set_answer(1, "b");
        session.go_next();
        let pending = session.begin_submit().unwrap().unwrap();
        session.apply_grading(pending.generation, Ok(build_report(50.0)));

        let generation_before = session.generation();
        session.reset(fixed_now());

        assert_eq!(session.phase(), SessionPhase::Answering);
        assert_eq!(session.current_index(), 0);
        assert!(session.answers().iter().all(String::is_empty));
        assert!(session.report().is_none());
        assert!(session.failure().is_none());
        assert_eq!(session.generation(), generation_before + 1);
    }

    #[test]
    fn replace_questions_resizes_buffer_and_bumps_generation() {
        let mut session = build_session(2);
        session.set_answer(0, "a");
        let generation_before = session.generation();

        session.replace_questions(vec![build_question(9)], fixed_now());

        assert_eq!(session.total_questions(), 1);
        assert_eq!(session.answers(), &[String::new()]);
        assert_eq!(session.generation(), generation_before + 1);
        assert_eq!(session.phase(), SessionPhase::Answering);
    }
}
