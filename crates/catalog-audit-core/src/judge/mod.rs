//! Judgment client: builds the review request, makes exactly one call, hands
//! back the raw text. Parsing and fallback live in `crate::verdict`.

mod judge_internal;

pub use judge_internal::rubric::{LengthBand, Rubric};

use crate::candidate::ContentInput;
use crate::errors::{ConfigError, JudgeCallError};
use crate::model::ProductRecord;
use crate::normalize::NormalizedFields;
use crate::providers::llm::dashscope::DashScopeClient;
use crate::providers::llm::fake::FakeClient;
use crate::providers::llm::tracing::TracingLlmClient;
use crate::providers::llm::LlmClient;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JudgeProvider {
    DashScope,
    Fake,
}

impl JudgeProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DashScope => "dashscope",
            Self::Fake => "fake",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dashscope" | "qwen" => Ok(Self::DashScope),
            "fake" => Ok(Self::Fake),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// Immutable judge settings, resolved once per process.
#[derive(Clone)]
pub struct JudgeRuntimeConfig {
    pub provider: JudgeProvider,
    pub model: String,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout: Option<Duration>,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for JudgeRuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JudgeRuntimeConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Clone)]
pub struct JudgeService {
    config: JudgeRuntimeConfig,
    client: Arc<dyn LlmClient>,
}

impl JudgeService {
    pub fn new(config: JudgeRuntimeConfig, client: Arc<dyn LlmClient>) -> Self {
        Self { config, client }
    }

    /// Builds the configured provider wrapped in the tracing decorator.
    pub fn from_config(config: JudgeRuntimeConfig) -> anyhow::Result<Self> {
        let inner: Arc<dyn LlmClient> = match config.provider {
            JudgeProvider::DashScope => {
                let key = config
                    .api_key
                    .clone()
                    .ok_or_else(|| ConfigError::MissingApiKey(config.provider.as_str().into()))?;
                Arc::new(DashScopeClient::new(
                    config.model.clone(),
                    key,
                    config.base_url.clone(),
                    config.timeout,
                )?)
            }
            JudgeProvider::Fake => Arc::new(FakeClient::new(config.model.clone())),
        };
        let client = Arc::new(TracingLlmClient::new(inner));
        Ok(Self::new(config, client))
    }

    pub fn config(&self) -> &JudgeRuntimeConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    /// Review one record. The prompt variant follows the record's populated fields.
    pub async fn review(
        &self,
        record: &ProductRecord,
        fields: &NormalizedFields,
    ) -> Result<String, JudgeCallError> {
        let request = judge_internal::prompt::review_request(record, fields, &self.config);
        judge_internal::client::call(self.client.as_ref(), &request).await
    }

    /// Score one optimized title, or its paired description, against a rubric.
    pub async fn rate(
        &self,
        rubric: Rubric,
        input: &ContentInput,
        optimized_title: &str,
    ) -> Result<String, JudgeCallError> {
        let request =
            judge_internal::rubric::rubric_request(rubric, input, optimized_title, &self.config);
        judge_internal::client::call(self.client.as_ref(), &request).await
    }
}
