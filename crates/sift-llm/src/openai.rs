//! OpenAI chat completions provider
//!
//! Works against the OpenAI API and any compatible gateway via a custom
//! base URL. Structured requests use `response_format = json_object`.

use crate::{http_client, status_error, Completion, CompletionRequest, LlmError, SummaryProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default OpenAI base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default HTTP timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Provider backed by the chat completions API
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    model: String,
    name: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    total_tokens: u32,
}

impl OpenAiProvider {
    /// Create a provider with an API key and model
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            name: format!("openai/{}", model),
            model,
            client: http_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }

    /// Set a custom base URL (Azure, proxies, compatible gateways)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the HTTP timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    fn build_request<'a>(&'a self, request: &CompletionRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if !request.system.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: request.system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.prompt_with_schema(),
        });

        ChatRequest {
            model: &self.model,
            messages,
            max_tokens: request.max_tokens,
            response_format: request
                .schema
                .as_ref()
                .map(|_| ResponseFormat { kind: "json_object" }),
        }
    }
}

#[async_trait]
impl SummaryProvider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        let body = self.build_request(request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
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

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| LlmError::InvalidResponse("No content in response".to_string()))?;

        Ok(Completion {
            text,
            model: parsed
                .model
                .map(|m| format!("openai/{}", m))
                .unwrap_or_else(|| self.name.clone()),
            tokens_used: parsed.usage.map(|u| u.total_tokens),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_includes_system_and_json_mode() {
        let provider = OpenAiProvider::new("key", "gpt-4o-mini");
        let request = CompletionRequest::new("prompt")
            .with_system("be terse")
            .with_schema("{}");
        let body = serde_json::to_value(provider.build_request(&request)).unwrap();

        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_request_without_schema_omits_format() {
        let provider = OpenAiProvider::new("key", "gpt-4o-mini");
        let body = serde_json::to_value(provider.build_request(&CompletionRequest::new("p"))).unwrap();
        assert!(body.get("response_format").is_none());
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{"choices":[{"message":{"content":"{}"}}],"usage":{"total_tokens":42}}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.usage.unwrap().total_tokens, 42);
    }

    #[tokio::test]
    async fn test_openai_error_handling() {
        let provider = OpenAiProvider::new("key", "model")
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2));
        let result = provider.complete(&CompletionRequest::new("test")).await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }
}
