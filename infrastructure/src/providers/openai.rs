//! OpenAI-compatible chat completions adapter
//!
//! Serves both the OpenAI family and Google, whose Gemini API exposes the
//! same `/chat/completions` shape.

use super::http;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use synod_application::ports::provider::{
    InvokeOutput, InvokeRequest, ProviderAdapter, ProviderError,
};
use synod_domain::CostClass;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const GOOGLE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

pub struct OpenAiCompatibleAdapter {
    name: String,
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiCompatibleAdapter {
    pub fn new(
        name: impl Into<String>,
        client: Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn openai(client: Client, api_key: impl Into<String>) -> Self {
        Self::new("openai", client, api_key, OPENAI_BASE_URL)
    }

    pub fn google(client: Client, api_key: impl Into<String>) -> Self {
        Self::new("google", client, api_key, GOOGLE_BASE_URL)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: u64,
}

fn body(request: &InvokeRequest) -> ChatRequest<'_> {
    ChatRequest {
        model: request.model.as_str(),
        messages: vec![
            ChatMessage {
                role: "system",
                content: &request.prompt.system,
            },
            ChatMessage {
                role: "user",
                content: &request.prompt.user,
            },
        ],
        max_tokens: request.max_tokens,
        temperature: request.temperature,
    }
}

fn into_output(response: ChatResponse, cost_class: CostClass) -> Result<InvokeOutput, ProviderError> {
    let cost = cost_class.cost_for_tokens(response.usage.map_or(0, |u| u.total_tokens));
    let Some(choice) = response.choices.into_iter().next() else {
        return Err(ProviderError::transient("no choices in response").with_billed(cost));
    };
    if choice.finish_reason.as_deref() == Some("content_filter") {
        return Err(ProviderError::permanent("content policy rejection").with_billed(cost));
    }
    match choice.message.content {
        Some(text) if !text.trim().is_empty() => Ok(InvokeOutput::new(text, cost)),
        _ => Err(ProviderError::transient("empty response").with_billed(cost)),
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiCompatibleAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, request: &InvokeRequest) -> Result<InvokeOutput, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let builder = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body(request));

        let response = http::send(builder, request).await?;
        let parsed: ChatResponse = response.json().await.map_err(http::decode_error)?;
        into_output(parsed, request.cost_class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_choice_is_used() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"Paris"},"finish_reason":"stop"}],
               "usage":{"total_tokens":2500}}"#,
        )
        .unwrap();
        let output = into_output(parsed, CostClass::Expensive).unwrap();
        assert_eq!(output.text, "Paris");
        assert_eq!(output.cost_units, 27);
    }

    #[test]
    fn test_content_filter_is_permanent() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":null},"finish_reason":"content_filter"}]}"#,
        )
        .unwrap();
        let err = into_output(parsed, CostClass::Cheap).unwrap_err();
        assert!(!err.is_transient());
    }

    #[test]
    fn test_missing_choices_is_transient() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(into_output(parsed, CostClass::Cheap).unwrap_err().is_transient());
    }

    #[test]
    fn test_google_uses_compatible_endpoint() {
        let adapter = OpenAiCompatibleAdapter::google(Client::new(), "key");
        assert_eq!(adapter.name(), "google");
        assert!(adapter.base_url.ends_with("/openai"));
    }
}
