use std::env;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lesson_core::model::{Exercise, LessonId, LessonSummary};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::LessonApiError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct LessonApiConfig {
    base_url: Url,
    token: Option<String>,
    timeout: Duration,
}

impl LessonApiConfig {
    /// # Errors
    ///
    /// Returns `LessonApiError::InvalidBaseUrl` if `base_url` does not parse.
    pub fn new(base_url: &str) -> Result<Self, LessonApiError> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Reads `KIRA_API_URL`, `KIRA_API_TOKEN` and `KIRA_API_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns `LessonApiError::NotConfigured` when `KIRA_API_URL` is unset or
    /// blank, and `LessonApiError::InvalidBaseUrl` when it does not parse.
    pub fn from_env() -> Result<Self, LessonApiError> {
        let base_url = env::var("KIRA_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(LessonApiError::NotConfigured)?;
        let mut config = Self::new(&base_url)?;
        config.token = env::var("KIRA_API_TOKEN")
            .ok()
            .filter(|v| !v.trim().is_empty());
        if let Some(secs) = env::var("KIRA_API_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.as_str().trim_end_matches('/'))
    }
}

//
// ─── SEAMS ─────────────────────────────────────────────────────────────────────
//

/// Where question sets come from.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch the ordered exercises of a lesson.
    ///
    /// # Errors
    ///
    /// Returns `LessonApiError` for transport, status or decoding failures.
    async fn fetch_questions(&self, lesson_id: LessonId) -> Result<Vec<Exercise>, LessonApiError>;
}

/// Where completed attempts are sent.
#[async_trait]
pub trait AttemptSink: Send + Sync {
    /// # Errors
    ///
    /// Returns `LessonApiError` for transport or status failures.
    async fn submit_attempt(&self, payload: &AttemptPayload) -> Result<(), LessonApiError>;
}

//
// ─── WIRE TYPES ────────────────────────────────────────────────────────────────
//

/// Body of `POST /submit-quiz`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptPayload {
    pub quiz_id: LessonId,
    pub pass_count: u32,
    pub fail_count: u32,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl From<&LessonSummary> for AttemptPayload {
    fn from(summary: &LessonSummary) -> Self {
        Self {
            quiz_id: summary.lesson_id(),
            pass_count: summary.pass_count(),
            fail_count: summary.fail_count(),
            start_at: summary.started_at(),
            end_at: summary.completed_at(),
        }
    }
}

/// Body of `GET /lesson-questions/{id}`. Items are decoded one by one so a
/// single bad record does not discard the lesson.
#[derive(Debug, Deserialize)]
struct QuestionsResponse {
    #[serde(default)]
    questions: Vec<serde_json::Value>,
}

//
// ─── CLIENT ────────────────────────────────────────────────────────────────────
//

#[derive(Clone)]
pub struct LessonApiClient {
    client: Client,
    config: LessonApiConfig,
}

impl LessonApiClient {
    /// # Errors
    ///
    /// Returns `LessonApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: LessonApiConfig) -> Result<Self, LessonApiError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// # Errors
    ///
    /// See `LessonApiConfig::from_env` and `LessonApiClient::new`.
    pub fn from_env() -> Result<Self, LessonApiError> {
        Self::new(LessonApiConfig::from_env()?)
    }

    #[must_use]
    pub fn config(&self) -> &LessonApiConfig {
        &self.config
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl QuestionSource for LessonApiClient {
    async fn fetch_questions(&self, lesson_id: LessonId) -> Result<Vec<Exercise>, LessonApiError> {
        let url = self
            .config
            .endpoint(&format!("lesson-questions/{lesson_id}"));
        let response = self.authorize(self.client.get(url)).send().await?;

        if !response.status().is_success() {
            return Err(LessonApiError::HttpStatus(response.status()));
        }

        let body: QuestionsResponse = response.json().await?;
        let mut exercises = Vec::with_capacity(body.questions.len());
        for raw in body.questions {
            match serde_json::from_value::<Exercise>(raw) {
                Ok(exercise) => exercises.push(exercise),
                Err(err) => tracing::warn!(%lesson_id, error = %err, "dropping undecodable exercise"),
            }
        }
        Ok(exercises)
    }
}

#[async_trait]
impl AttemptSink for LessonApiClient {
    async fn submit_attempt(&self, payload: &AttemptPayload) -> Result<(), LessonApiError> {
        let url = self.config.endpoint("submit-quiz");
        let response = self
            .authorize(self.client.post(url))
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(%status, body = %body, "submit-quiz rejected");
            return Err(LessonApiError::HttpStatus(status));
        }
        tracing::debug!(%status, "submit-quiz acknowledged");
        Ok(())
    }
}
