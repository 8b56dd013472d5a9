pub mod dashscope;
pub mod fake;
pub mod tracing;

use crate::model::{CompletionRequest, LlmResponse};
use async_trait::async_trait;

/// The external judge capability: role-tagged messages in, raw text out.
///
/// One call per invocation. Implementations never retry; a failure is handed
/// back to the caller, which turns it into a default review.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<LlmResponse>;

    fn provider_name(&self) -> &'static str;

    /// Model identifier, when the provider pins one.
    fn model_name(&self) -> Option<&str> {
        None
    }
}
