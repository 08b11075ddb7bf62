//! Anthropic Messages API provider

use crate::{http_client, status_error, Completion, CompletionRequest, LlmError, SummaryProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Anthropic API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";

/// API version header value
pub const API_VERSION: &str = "2023-06-01";

/// Default HTTP timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Provider backed by the Anthropic Messages API
pub struct AnthropicProvider {
    endpoint: String,
    api_key: String,
    model: String,
    name: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

impl AnthropicProvider {
    /// Create a provider with an API key and model
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            name: format!("anthropic/{}", model),
            model,
            client: http_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }

    /// Point the provider at a different endpoint (proxies, test servers)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the HTTP timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }
}

#[async_trait]
impl SummaryProvider for AnthropicProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: vec![Message {
                role: "user",
                content: request.prompt_with_schema(),
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.endpoint))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(status_error(status, error_text, &self.model));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let text: String = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(LlmError::InvalidResponse("Empty response content".to_string()));
        }

        Ok(Completion {
            text,
            model: parsed
                .model
                .map(|m| format!("anthropic/{}", m))
                .unwrap_or_else(|| self.name.clone()),
            tokens_used: parsed.usage.map(|u| u.input_tokens + u.output_tokens),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anthropic_provider_creation() {
        let provider = AnthropicProvider::new("key", "claude-sonnet-4-5")
            .with_endpoint("http://localhost:8080/");
        assert_eq!(provider.name(), "anthropic/claude-sonnet-4-5");
        assert_eq!(provider.endpoint, "http://localhost:8080");
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "content": [{"type": "text", "text": "{\"a\": 1}"}],
            "model": "claude-sonnet-4-5",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.content[0].text.as_deref(), Some("{\"a\": 1}"));
        let usage = parsed.usage.unwrap();
        assert_eq!(usage.input_tokens + usage.output_tokens, 15);
    }

    #[tokio::test]
    async fn test_anthropic_error_handling() {
        let provider = AnthropicProvider::new("key", "model")
            .with_endpoint("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2));
        let result = provider.complete(&CompletionRequest::new("test")).await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }
}
