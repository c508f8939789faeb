//! Anthropic Messages API adapter

use super::http;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use synod_application::ports::provider::{
    InvokeOutput, InvokeRequest, ProviderAdapter, ProviderError,
};
use synod_domain::CostClass;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter {
    client: Client,
    api_key: String,
    base_url: String,
    api_version: String,
}

impl AnthropicAdapter {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

fn body(request: &InvokeRequest) -> MessagesRequest<'_> {
    MessagesRequest {
        model: request.model.as_str(),
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        system: &request.prompt.system,
        messages: vec![Message {
            role: "user",
            content: &request.prompt.user,
        }],
    }
}

fn into_output(
    response: MessagesResponse,
    cost_class: CostClass,
) -> Result<InvokeOutput, ProviderError> {
    let tokens = response
        .usage
        .as_ref()
        .map_or(0, |u| u.input_tokens + u.output_tokens);
    let cost = cost_class.cost_for_tokens(tokens);

    if response.stop_reason.as_deref() == Some("refusal") {
        return Err(ProviderError::permanent("content policy refusal").with_billed(cost));
    }
    let text: String = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("");
    if text.trim().is_empty() {
        return Err(ProviderError::transient("empty response").with_billed(cost));
    }
    Ok(InvokeOutput::new(text, cost))
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn invoke(&self, request: &InvokeRequest) -> Result<InvokeOutput, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url);
        let builder = self
            .client
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body(request));

        let response = http::send(builder, request).await?;
        let parsed: MessagesResponse = response.json().await.map_err(http::decode_error)?;
        debug!(model = %request.model, stop_reason = ?parsed.stop_reason, "anthropic response");
        into_output(parsed, request.cost_class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> MessagesResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_text_blocks_are_joined_and_costed() {
        let parsed = response(
            r#"{"content":[{"type":"thinking","text":"hmm"},{"type":"text","text":"Hello"},{"type":"text","text":" world"}],
               "usage":{"input_tokens":900,"output_tokens":300},"stop_reason":"end_turn"}"#,
        );
        let output = into_output(parsed, CostClass::Medium).unwrap();
        assert_eq!(output.text, "Hello world");
        assert_eq!(output.cost_units, 6);
    }

    #[test]
    fn test_refusal_is_permanent_and_billed() {
        let parsed = response(
            r#"{"content":[],"usage":{"input_tokens":10,"output_tokens":0},"stop_reason":"refusal"}"#,
        );
        let err = into_output(parsed, CostClass::Cheap).unwrap_err();
        assert!(!err.is_transient());
        assert_eq!(err.billed_units, 1);
    }

    #[test]
    fn test_base_url_is_normalized() {
        let adapter = AnthropicAdapter::new(Client::new(), "key").with_base_url("http://proxy/");
        assert_eq!(adapter.base_url, "http://proxy");
    }
}
