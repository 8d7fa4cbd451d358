use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use quiz_core::{AnswerRecord, GradingReport, GradingSummary, QuestionId, QuestionOutcome};

use crate::error::GradingError;

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Connection settings shared by the grading and persistence clients.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8000/api";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Read the base URL and timeout from `QUIZ_API_BASE_URL` /
    /// `QUIZ_API_TIMEOUT_SECS`, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            env::var("QUIZ_API_BASE_URL").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.into());
        let timeout = env::var("QUIZ_API_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .map_or(Self::DEFAULT_TIMEOUT, Duration::from_secs);
        Self { base_url, timeout }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

//
// ─── BACKEND TRAIT ─────────────────────────────────────────────────────────────
//

/// Scores one submitted batch of question/answer pairs.
///
/// The session layer talks to grading only through this trait so tests can
/// inject scripted backends.
#[async_trait]
pub trait GradingBackend: Send + Sync {
    /// Grade the batch and return a normalized report.
    ///
    /// # Errors
    ///
    /// Returns `GradingError` for transport failures, non-2xx statuses, and
    /// responses whose aggregate score block is unusable.
    async fn grade(&self, batch: &[AnswerRecord]) -> Result<GradingReport, GradingError>;
}

//
// ─── HTTP CLIENT ───────────────────────────────────────────────────────────────
//

/// Grading client for the remote evaluation service.
#[derive(Clone)]
pub struct HttpGrader {
    client: Client,
    config: ApiConfig,
}

impl HttpGrader {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ApiConfig::from_env())
    }
}

#[async_trait]
impl GradingBackend for HttpGrader {
    async fn grade(&self, batch: &[AnswerRecord]) -> Result<GradingReport, GradingError> {
        let payload = CheckAnswersRequest {
            answers: batch.iter().map(AnswerPayload::from_record).collect(),
        };

        let response = self
            .client
            .post(self.config.endpoint("check-answers"))
            .timeout(self.config.timeout)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GradingError::HttpStatus {
                status,
                message: error_detail(&body),
            });
        }

        parse_grading_body(&body)
    }
}

//
// ─── WIRE SHAPES ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
struct CheckAnswersRequest<'a> {
    answers: Vec<AnswerPayload<'a>>,
}

#[derive(Debug, Serialize)]
struct AnswerPayload<'a> {
    question_id: &'a QuestionId,
    question: &'a str,
    user_answer: &'a str,
    correct_answer: &'a str,
    explanation: Option<&'a str>,
    options: Option<&'a [String]>,
    #[serde(rename = "type")]
    kind: &'a str,
}

impl<'a> AnswerPayload<'a> {
    fn from_record(record: &'a AnswerRecord) -> Self {
        let question = &record.question;
        let options = question.options();
        Self {
            question_id: question.id(),
            question: question.prompt(),
            user_answer: &record.user_answer,
            correct_answer: question.correct_answer(),
            explanation: question.explanation(),
            options: if options.is_empty() {
                None
            } else {
                Some(options)
            },
            kind: question.kind().as_str(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResultPayload {
    #[serde(default)]
    question_id: Option<QuestionId>,
    is_correct: bool,
    #[serde(default)]
    question: String,
    #[serde(default)]
    user_answer: String,
    #[serde(default)]
    correct_answer: String,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    explanation: Option<String>,
}

impl From<ResultPayload> for QuestionOutcome {
    fn from(payload: ResultPayload) -> Self {
        Self {
            question_ref: payload.question_id,
            is_correct: payload.is_correct,
            question: payload.question,
            user_answer: payload.user_answer,
            correct_answer: payload.correct_answer,
            feedback: payload.feedback,
            explanation: payload.explanation,
        }
    }
}

//
// ─── RESPONSE NORMALIZATION ────────────────────────────────────────────────────
//

/// Normalize a 2xx response body into a `GradingReport`.
///
/// The service is trusted for nothing: the body must be JSON with a `total`
/// block whose `score_percentage` is numeric, otherwise the raw body is
/// retained for diagnostic display. Individual `results` entries that do not
/// parse are skipped rather than failing the whole response.
pub(crate) fn parse_grading_body(body: &str) -> Result<GradingReport, GradingError> {
    let malformed = || GradingError::Malformed {
        raw: body.to_owned(),
    };

    let value: Value = serde_json::from_str(body).map_err(|_| malformed())?;
    let total = value.get("total").ok_or_else(malformed)?;
    let score_percentage = total
        .get("score_percentage")
        .and_then(Value::as_f64)
        .ok_or_else(malformed)?;

    let summary = GradingSummary::new(
        score_percentage,
        read_count(total, "total_score"),
        read_count(total, "total_questions"),
        total
            .get("overall_feedback")
            .and_then(Value::as_str)
            .unwrap_or_default(),
    )
    .map_err(|_| malformed())?;

    let outcomes = value
        .get("results")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    serde_json::from_value::<ResultPayload>(item.clone())
                        .ok()
                        .map(QuestionOutcome::from)
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(GradingReport::new(summary, outcomes))
}

fn read_count(total: &Value, field: &str) -> u32 {
    total
        .get(field)
        .and_then(Value::as_u64)
        .map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX))
}

/// Pull a human-readable message out of a service error payload.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .or_else(|| value.get("error"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| "grading service request failed".to_owned())
}
