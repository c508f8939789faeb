//! Deterministic in-process provider
//!
//! Answers without any network access. Output depends only on the model id
//! and the prompt, which makes offline runs reproducible.

use async_trait::async_trait;
use std::time::Duration;
use synod_application::ports::provider::{
    InvokeOutput, InvokeRequest, ProviderAdapter, ProviderError,
};
use synod_domain::core::string::{excerpt, squash_whitespace};
use synod_domain::prompt::SYNTHESIS_SYSTEM;

/// Rough characters-per-token ratio used to cost local replies.
const CHARS_PER_TOKEN: u64 = 4;

#[derive(Debug, Default)]
pub struct LocalAdapter {
    latency: Duration,
}

impl LocalAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulated per-call latency, for watching progress output.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn reply(request: &InvokeRequest) -> String {
        if request.prompt.system == SYNTHESIS_SYSTEM {
            let sources = request
                .prompt
                .user
                .lines()
                .filter(|line| line.starts_with("--- ") && line.ends_with(" ---"))
                .count();
            return format!(
                "## Answer\nOffline synthesis of {} contributions.\n\n\
                 ## Agreement\n- Every contribution was produced offline\n\n\
                 ## Disagreement\n- None\n",
                sources
            );
        }

        let prompt = excerpt(&squash_whitespace(&request.prompt.user), 160);
        format!(
            "This is an offline answer. {} read the prompt: {}",
            request.model, prompt
        )
    }
}

#[async_trait]
impl ProviderAdapter for LocalAdapter {
    fn name(&self) -> &str {
        "local"
    }

    async fn invoke(&self, request: &InvokeRequest) -> Result<InvokeOutput, ProviderError> {
        if !self.latency.is_zero() {
            tokio::select! {
                biased;
                _ = request.cancel.cancelled() => {
                    return Err(ProviderError::transient("cancelled"));
                }
                _ = tokio::time::sleep(self.latency) => {}
            }
        }

        let text = Self::reply(request);
        let tokens = (request.prompt.user.len() + text.len()) as u64 / CHARS_PER_TOKEN;
        Ok(InvokeOutput::new(
            text,
            request.cost_class.cost_for_tokens(tokens),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synod_domain::{CostClass, ModelId, Prompt, PromptTemplate, ProviderFamily};
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    fn request(model: &str, prompt: Prompt) -> InvokeRequest {
        InvokeRequest {
            model: ModelId::new(model),
            family: ProviderFamily::Local,
            cost_class: CostClass::Cheap,
            prompt,
            max_tokens: 256,
            temperature: 0.0,
            deadline: Instant::now() + Duration::from_secs(5),
            cancel: CancellationToken::new(),
        }
    }

    #[tokio::test]
    async fn test_replies_are_deterministic() {
        let adapter = LocalAdapter::new();
        let req = request("local-a", PromptTemplate::panel("What is Rust?", None));
        let first = adapter.invoke(&req).await.unwrap();
        let second = adapter.invoke(&req).await.unwrap();
        assert_eq!(first, second);
        assert!(first.text.contains("local-a"));
        assert!(first.cost_units >= 1);
    }

    #[tokio::test]
    async fn test_synthesis_prompts_get_sections() {
        let adapter = LocalAdapter::new();
        let prompt = Prompt::new(
            SYNTHESIS_SYSTEM,
            "Q\n\n--- a (weight 5.0) ---\nx\n\n--- b (weight 4.0) ---\ny\n",
        );
        let output = adapter.invoke(&request("local-a", prompt)).await.unwrap();
        assert!(output.text.starts_with("## Answer\nOffline synthesis of 2 contributions."));
        assert!(output.text.contains("## Disagreement"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_simulated_latency() {
        let adapter = LocalAdapter::new().with_latency(Duration::from_secs(60));
        let req = request("local-a", Prompt::new("s", "u"));
        req.cancel.cancel();
        let err = adapter.invoke(&req).await.unwrap_err();
        assert!(err.is_transient());
    }
}
