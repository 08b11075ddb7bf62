//! Sift Summarization Provider Layer
//!
//! Pluggable providers for the external summarization capability, plus the
//! primary/fallback routing the pipeline relies on.
//!
//! # Architecture
//!
//! Every backend implements the async [`SummaryProvider`] trait. Providers
//! are resolved once at startup into a [`ProviderSlot`] (configured, or
//! permanently unavailable when credentials are missing), and a
//! [`ProviderChain`] routes each request to the primary slot first and the
//! fallback slot second.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `AnthropicProvider`: Anthropic Messages API
//! - `OpenAiProvider`: OpenAI (or compatible) chat completions
//! - `OllamaProvider`: Local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use sift_llm::{CompletionRequest, MockProvider, SummaryProvider};
//!
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # rt.block_on(async {
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.complete(&CompletionRequest::new("test prompt")).await.unwrap();
//! assert_eq!(result.text, "Hello from LLM!");
//! # });
//! ```

#![warn(missing_docs)]

pub mod anthropic;
pub mod chain;
pub mod ollama;
pub mod openai;
pub mod slot;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

pub use anthropic::AnthropicProvider;
pub use chain::{ChainError, ProviderChain, ProviderFailure, Routed};
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use slot::{ProviderConfig, ProviderKind, ProviderSlot};

/// Errors that can occur during provider calls
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Call exceeded its time budget
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// A single structured-output request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instructions
    pub system: String,

    /// User prompt
    pub prompt: String,

    /// JSON schema the response must follow, if any
    pub schema: Option<String>,

    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Default generation budget
    pub const DEFAULT_MAX_TOKENS: u32 = 8192;

    /// Create a request with only a user prompt
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: String::new(),
            prompt: prompt.into(),
            schema: None,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
        }
    }

    /// Set system instructions
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    /// Attach the JSON schema the response must follow
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Set the generation budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Prompt with the schema appended, for providers without native schema support
    pub fn prompt_with_schema(&self) -> String {
        match &self.schema {
            Some(schema) => format!(
                "{}\n\nRespond with JSON matching this schema:\n{}",
                self.prompt, schema
            ),
            None => self.prompt.clone(),
        }
    }
}

/// Raw provider output
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Generated text (expected to be JSON for structured requests)
    pub text: String,

    /// Model that produced the text
    pub model: String,

    /// Total tokens reported by the provider, if any
    pub tokens_used: Option<u32>,
}

/// An external summarization capability
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// Provider identifier, e.g. `anthropic/claude-sonnet-4-5`
    fn name(&self) -> &str;

    /// Run one completion request
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError>;
}

/// Map a non-success HTTP status to an error
pub(crate) fn status_error(status: reqwest::StatusCode, body: String, model: &str) -> LlmError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        LlmError::RateLimitExceeded
    } else if status == reqwest::StatusCode::NOT_FOUND {
        LlmError::ModelNotAvailable(model.to_string())
    } else {
        LlmError::Communication(format!("HTTP {}: {}", status, body))
    }
}

/// Build an HTTP client with a request timeout
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

type Responder = dyn Fn(&str) -> Result<String, LlmError> + Send + Sync;

/// Mock provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Responses can be fixed, keyed by a prompt fragment, or computed from the
/// prompt by a closure. The mock also tracks how many calls were in flight
/// at once, which lets scheduler tests check their concurrency bound.
///
/// # Examples
///
/// ```
/// use sift_llm::{CompletionRequest, MockProvider, SummaryProvider};
///
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # rt.block_on(async {
/// let mut provider = MockProvider::default();
/// provider.add_response("alpha", "response1");
/// let out = provider.complete(&CompletionRequest::new("prompt with alpha")).await.unwrap();
/// assert_eq!(out.text, "response1");
/// # });
/// ```
#[derive(Clone)]
pub struct MockProvider {
    name: String,
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    responder: Option<Arc<Responder>>,
    delay: Option<Duration>,
    call_count: Arc<Mutex<usize>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            name: "mock".to_string(),
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            responder: None,
            delay: None,
            call_count: Arc::new(Mutex::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a MockProvider that computes each response from the prompt
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        let mut provider = Self::default();
        provider.responder = Some(Arc::new(responder));
        provider
    }

    /// Create a MockProvider whose every call fails
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::from_fn(move |_| Err(LlmError::Communication(message.clone())))
    }

    /// Set the provider name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sleep before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Return `response` for prompts containing `fragment`
    pub fn add_response(&mut self, fragment: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(fragment.into(), response.into());
    }

    /// Configure to return an error for prompts containing `fragment`
    pub fn add_error(&mut self, fragment: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(fragment.into(), "ERROR".to_string());
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap() = 0;
    }

    /// Highest number of calls observed in flight at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn respond(&self, prompt: &str) -> Result<String, LlmError> {
        if let Some(responder) = &self.responder {
            return responder(prompt);
        }

        let responses = self.responses.lock().unwrap();
        let mut matches: Vec<_> = responses
            .iter()
            .filter(|(fragment, _)| prompt.contains(fragment.as_str()))
            .collect();
        // Longest fragment wins so that overlapping keys stay deterministic
        matches.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
        if let Some((_, response)) = matches.first() {
            if response.as_str() == "ERROR" {
                return Err(LlmError::Other("Mock error".to_string()));
            }
            return Ok((*response).clone());
        }

        Ok(self.default_response.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl SummaryProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        *self.call_count.lock().unwrap() += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let result = self.respond(&request.prompt);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        result.map(|text| Completion {
            text,
            model: self.name.clone(),
            tokens_used: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> CompletionRequest {
        CompletionRequest::new(prompt)
    }

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.complete(&request("any prompt")).await;
        assert_eq!(result.unwrap().text, "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_specific_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.complete(&request("say hello")).await.unwrap().text, "world");
        assert_eq!(provider.complete(&request("foo!")).await.unwrap().text, "bar");
        assert_eq!(
            provider.complete(&request("unknown")).await.unwrap().text,
            "Default mock response"
        );
    }

    #[tokio::test]
    async fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);

        provider.complete(&request("prompt1")).await.unwrap();
        assert_eq!(provider.call_count(), 1);

        provider.complete(&request("prompt2")).await.unwrap();
        assert_eq!(provider.call_count(), 2);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = provider.complete(&request("a bad prompt")).await;
        assert!(matches!(result.unwrap_err(), LlmError::Other(_)));
    }

    #[tokio::test]
    async fn test_mock_provider_from_fn() {
        let provider = MockProvider::from_fn(|prompt| Ok(prompt.to_uppercase()));
        assert_eq!(provider.complete(&request("abc")).await.unwrap().text, "ABC");
    }

    #[tokio::test]
    async fn test_mock_provider_failing() {
        let provider = MockProvider::failing("down");
        let err = provider.complete(&request("x")).await.unwrap_err();
        assert_eq!(err, LlmError::Communication("down".to_string()));
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_counters() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.complete(&request("test")).await.unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }

    #[test]
    fn test_prompt_with_schema() {
        let req = CompletionRequest::new("Summarize").with_schema("{\"type\":\"object\"}");
        let prompt = req.prompt_with_schema();
        assert!(prompt.starts_with("Summarize"));
        assert!(prompt.contains("\"type\":\"object\""));
        assert_eq!(CompletionRequest::new("x").prompt_with_schema(), "x");
    }

    #[test]
    fn test_status_error_mapping() {
        assert_eq!(
            status_error(reqwest::StatusCode::TOO_MANY_REQUESTS, String::new(), "m"),
            LlmError::RateLimitExceeded
        );
        assert_eq!(
            status_error(reqwest::StatusCode::NOT_FOUND, String::new(), "m"),
            LlmError::ModelNotAvailable("m".to_string())
        );
        assert!(matches!(
            status_error(reqwest::StatusCode::BAD_GATEWAY, "oops".to_string(), "m"),
            LlmError::Communication(_)
        ));
    }
}
