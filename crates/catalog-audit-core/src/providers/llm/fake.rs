use super::LlmClient;
use crate::errors::{JudgeCallError, JudgeCallErrorKind};
use crate::judge::Rubric;
use crate::model::{CompletionRequest, LlmResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Offline judge. Answers from a script first, then the fixed response, and
/// otherwise a PASS review shaped after the prompt's requested keys.
#[derive(Debug)]
pub struct FakeClient {
    model: String,
    fixed_response: Option<String>,
    script: Mutex<VecDeque<Result<String, JudgeCallError>>>,
}

impl FakeClient {
    pub fn new(model: String) -> Self {
        Self {
            model,
            fixed_response: None,
            script: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_response(mut self, response: String) -> Self {
        self.fixed_response = Some(response);
        self
    }

    /// Queue responses consumed one per call, in order.
    pub fn with_script<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Ok(mut script) = self.script.lock() {
            script.extend(responses.into_iter().map(|r| Ok(r.into())));
        }
        self
    }

    /// Queue a failing call.
    pub fn with_failure(self, kind: JudgeCallErrorKind, message: impl Into<String>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Err(JudgeCallError::new(kind, message).with_provider("fake")));
        }
        self
    }

    fn next_scripted(&self) -> Option<Result<String, JudgeCallError>> {
        self.script.lock().ok().and_then(|mut s| s.pop_front())
    }
}

fn quoted(prompt: &str, key: &str) -> bool {
    prompt.contains(&format!("\"{key}\""))
}

fn full_marks(keys: &[&str]) -> serde_json::Value {
    keys.iter()
        .map(|k| {
            (
                k.to_string(),
                serde_json::json!({ "score": 2, "reason": "fake judge" }),
            )
        })
        .collect::<serde_json::Map<_, _>>()
        .into()
}

/// PASS for every review key the prompt asks for, full marks for rubric prompts.
fn default_answer(prompt: &str) -> String {
    if quoted(prompt, "must_have") {
        let mut answer = serde_json::json!({
            "must_have_score": 2,
            "must_avoid_score": 2,
            "overall_score": 2,
            "overall_reason": "fake judge"
        });
        let rubric = [Rubric::Title, Rubric::Description]
            .into_iter()
            .find(|r| r.must_have().iter().all(|k| quoted(prompt, k)));
        if let Some(rubric) = rubric {
            answer["must_have"] = full_marks(rubric.must_have());
            answer["must_avoid"] = full_marks(rubric.must_avoid());
        }
        return answer.to_string();
    }
    let mut review = serde_json::Map::new();
    for key in crate::model::Aspect::ALL.iter().map(|a| a.key()) {
        if quoted(prompt, key) {
            review.insert(
                key.to_string(),
                serde_json::json!({ "status": "PASS", "reason": "fake judge" }),
            );
        }
    }
    serde_json::Value::Object(review).to_string()
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<LlmResponse> {
        let text = match self.next_scripted() {
            Some(Ok(text)) => text,
            Some(Err(err)) => return Err(err.into()),
            None => self
                .fixed_response
                .clone()
                .unwrap_or_else(|| default_answer(request.user_prompt())),
        };

        Ok(LlmResponse {
            text,
            provider: "fake".to_string(),
            model: self.model.clone(),
            meta: serde_json::json!({}),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_name(&self) -> Option<&str> {
        Some(&self.model)
    }
}
