use crate::errors::JudgeCallError;
use crate::model::{CompletionRequest, LlmResponse};
use crate::providers::llm::LlmClient;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info_span, Instrument};

/// Wraps a judge client so every call runs inside a `judge.request` span.
pub struct TracingLlmClient {
    inner: Arc<dyn LlmClient>,
}

impl TracingLlmClient {
    pub fn new(inner: Arc<dyn LlmClient>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl LlmClient for TracingLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<LlmResponse> {
        let provider = self.inner.provider_name();
        let span = info_span!(
            "judge.request",
            "judge.provider" = provider,
            "judge.model" = self.inner.model_name().unwrap_or("unknown"),
            "judge.prompt_chars" = request.user_prompt().chars().count(),
            "judge.latency_ms" = tracing::field::Empty,
            "judge.usage.input_tokens" = tracing::field::Empty,
            "judge.usage.output_tokens" = tracing::field::Empty,
            "error" = tracing::field::Empty,
            "error.kind" = tracing::field::Empty,
            "error.classified_from_message" = tracing::field::Empty,
            "error.message" = tracing::field::Empty
        );

        async move {
            let start = std::time::Instant::now();
            let result = self.inner.complete(request).await;
            let span = tracing::Span::current();
            span.record("judge.latency_ms", start.elapsed().as_millis() as u64);

            match &result {
                Ok(resp) => {
                    if let Some(usage) = resp.meta.get("usage") {
                        if let Some(i) = usage.get("prompt_tokens").and_then(|v| v.as_u64()) {
                            span.record("judge.usage.input_tokens", i);
                        }
                        if let Some(o) = usage.get("completion_tokens").and_then(|v| v.as_u64()) {
                            span.record("judge.usage.output_tokens", o);
                        }
                    }
                }
                Err(e) => {
                    let typed = JudgeCallError::from_anyhow(e);
                    span.record("error", true);
                    span.record("error.kind", typed.kind.as_str());
                    span.record("error.classified_from_message", typed.legacy_classified);
                    span.record("error.message", e.to_string().as_str());
                }
            }

            result
        }
        .instrument(span)
        .await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> Option<&str> {
        self.inner.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::JudgeCallErrorKind;
    use crate::model::ChatMessage;
    use crate::providers::llm::fake::FakeClient;
    use std::sync::Mutex;
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Collects `error.classified_from_message` values recorded on spans.
    #[derive(Clone, Default)]
    struct ClassifiedFlags(Arc<Mutex<Vec<bool>>>);

    struct FlagVisitor<'a>(&'a mut Vec<bool>);

    impl Visit for FlagVisitor<'_> {
        fn record_bool(&mut self, field: &Field, value: bool) {
            if field.name() == "error.classified_from_message" {
                self.0.push(value);
            }
        }

        fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
    }

    impl<S: tracing::Subscriber> Layer<S> for ClassifiedFlags {
        fn on_record(
            &self,
            _id: &tracing::span::Id,
            values: &tracing::span::Record<'_>,
            _ctx: Context<'_, S>,
        ) {
            let mut seen = self.0.lock().unwrap();
            values.record(&mut FlagVisitor(&mut seen));
        }
    }

    struct UntypedFailure;

    #[async_trait]
    impl LlmClient for UntypedFailure {
        async fn complete(&self, _request: &CompletionRequest) -> anyhow::Result<LlmResponse> {
            anyhow::bail!("connection reset by peer")
        }

        fn provider_name(&self) -> &'static str {
            "untyped"
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("prompt")],
            temperature: 0.3,
            max_tokens: None,
        }
    }

    #[tokio::test]
    async fn passes_through_responses_and_errors() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();

        let inner = Arc::new(
            FakeClient::new("fake-model".to_string())
                .with_script(["ok"])
                .with_failure(JudgeCallErrorKind::Server, "provider error: 503"),
        );
        let client = TracingLlmClient::new(inner);
        assert_eq!(client.provider_name(), "fake");
        assert_eq!(client.model_name(), Some("fake-model"));

        assert_eq!(client.complete(&request()).await.unwrap().text, "ok");
        let err = client.complete(&request()).await.unwrap_err();
        assert_eq!(
            JudgeCallError::from_anyhow(&err).kind,
            JudgeCallErrorKind::Server
        );
    }

    #[tokio::test]
    async fn records_how_the_error_kind_was_derived() {
        let flags = ClassifiedFlags::default();
        let subscriber = tracing_subscriber::registry().with(flags.clone());
        let _guard = tracing::subscriber::set_default(subscriber);

        let typed = TracingLlmClient::new(Arc::new(
            FakeClient::new("fake-model".to_string())
                .with_failure(JudgeCallErrorKind::Server, "provider error: 503"),
        ));
        assert!(typed.complete(&request()).await.is_err());

        let untyped = TracingLlmClient::new(Arc::new(UntypedFailure));
        let err = untyped.complete(&request()).await.unwrap_err();
        assert_eq!(
            JudgeCallError::from_anyhow(&err).kind,
            JudgeCallErrorKind::Network
        );

        assert_eq!(*flags.0.lock().unwrap(), vec![false, true]);
    }
}
