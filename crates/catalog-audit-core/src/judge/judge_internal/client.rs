use crate::errors::JudgeCallError;
use crate::model::CompletionRequest;
use crate::providers::llm::LlmClient;

/// One outbound call, no retry. Blank text counts as a failed call.
pub(crate) async fn call(
    client: &dyn LlmClient,
    request: &CompletionRequest,
) -> Result<String, JudgeCallError> {
    tracing::debug!(
        provider = client.provider_name(),
        prompt_chars = request.user_prompt().chars().count(),
        "judge call"
    );
    let resp = client
        .complete(request)
        .await
        .map_err(|e| JudgeCallError::from_anyhow(&e))?;

    let text = resp.text.trim();
    if text.is_empty() {
        return Err(JudgeCallError::empty_response(client.provider_name()));
    }
    Ok(text.to_string())
}
