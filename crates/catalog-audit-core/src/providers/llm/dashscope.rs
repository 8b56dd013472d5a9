use super::LlmClient;
use crate::errors::JudgeCallError;
use crate::model::{CompletionRequest, LlmResponse};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
pub const DEFAULT_MODEL: &str = "qwen-plus";
const PROVIDER: &str = "dashscope";

/// DashScope chat completions through its OpenAI-compatible endpoint.
pub struct DashScopeClient {
    pub model: String,
    pub base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for DashScopeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashScopeClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl DashScopeClient {
    pub fn new(
        model: String,
        api_key: String,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self {
            model,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn body(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut body = json!({
            "model": self.model,
            "messages": request.messages,
            "temperature": request.temperature,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }
}

#[async_trait]
impl LlmClient for DashScopeClient {
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<LlmResponse> {
        let resp = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.body(request))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(JudgeCallError::from_status(status.as_u16(), PROVIDER, error_text).into());
        }

        let json: serde_json::Value = resp.json().await?;

        // choices[0].message.content
        let text = json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| JudgeCallError::empty_response(PROVIDER))?
            .to_string();

        Ok(LlmResponse {
            text,
            provider: PROVIDER.to_string(),
            model: self.model.clone(),
            meta: json!({ "usage": json.get("usage").cloned().unwrap_or_default() }),
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn model_name(&self) -> Option<&str> {
        Some(&self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChatMessage;

    fn client() -> DashScopeClient {
        DashScopeClient::new(
            DEFAULT_MODEL.to_string(),
            "sk-test".to_string(),
            Some("https://example.invalid/v1/".to_string()),
            Some(Duration::from_secs(5)),
        )
        .unwrap()
    }

    #[test]
    fn body_carries_roles_and_temperature() {
        let request = CompletionRequest {
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
            temperature: 0.3,
            max_tokens: None,
        };
        let body = client().body(&request);
        assert_eq!(body["model"], "qwen-plus");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert!((body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        assert_eq!(client().endpoint(), "https://example.invalid/v1/chat/completions");
    }

    #[test]
    fn debug_redacts_api_key() {
        let dbg = format!("{:?}", client());
        assert!(!dbg.contains("sk-test"));
        assert!(dbg.contains("[REDACTED]"));
    }
}
