use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use quiz_core::Question;

use crate::error::PersistenceError;
use crate::grader::ApiConfig;

/// Persists a question set for a user.
///
/// Fire-and-forget from the session's perspective: the response is ignored
/// beyond success/failure reporting.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Store the question set under the given user identity.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` when the store rejects the request or the
    /// call fails.
    async fn save_questions(
        &self,
        user_id: &str,
        questions: &[Question],
    ) -> Result<(), PersistenceError>;
}

/// Question store client for the remote persistence endpoint.
#[derive(Clone)]
pub struct HttpQuestionStore {
    client: Client,
    config: ApiConfig,
}

impl HttpQuestionStore {
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

#[derive(Debug, Serialize)]
struct SaveQuestionsRequest<'a> {
    user_id: &'a str,
    questions: &'a [Question],
}

#[async_trait]
impl QuestionStore for HttpQuestionStore {
    async fn save_questions(
        &self,
        user_id: &str,
        questions: &[Question],
    ) -> Result<(), PersistenceError> {
        let response = self
            .client
            .post(self.config.endpoint("save-questions"))
            .timeout(self.config.timeout)
            .json(&SaveQuestionsRequest { user_id, questions })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PersistenceError::HttpStatus(status));
        }
        Ok(())
    }
}
