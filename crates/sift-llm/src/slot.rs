//! Provider configuration and resolution
//!
//! A [`ProviderSlot`] is resolved once at startup. A slot whose credentials
//! are missing stays [`ProviderSlot::Unavailable`] for the whole run and is
//! skipped by the chain without a network call.

use crate::{AnthropicProvider, OllamaProvider, OpenAiProvider, SummaryProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Supported provider backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Anthropic Messages API
    Anthropic,
    /// OpenAI chat completions
    #[serde(rename = "openai")]
    OpenAi,
    /// Local Ollama server
    Ollama,
}

impl ProviderKind {
    /// Environment variable holding the API key by default
    pub fn default_api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            ProviderKind::Ollama => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Anthropic => write!(f, "anthropic"),
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::Ollama => write!(f, "ollama"),
        }
    }
}

/// Configuration for one provider slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Backend kind
    pub kind: ProviderKind,

    /// Model identifier
    pub model: String,

    /// Endpoint or base URL override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Environment variable holding the API key (defaults per kind)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Generation budget per request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_max_tokens() -> u32 {
    crate::CompletionRequest::DEFAULT_MAX_TOKENS
}

impl ProviderConfig {
    /// Default primary: Anthropic
    pub fn anthropic() -> Self {
        Self {
            kind: ProviderKind::Anthropic,
            model: "claude-sonnet-4-5".to_string(),
            endpoint: None,
            api_key_env: None,
            max_tokens: default_max_tokens(),
        }
    }

    /// Default fallback: OpenAI
    pub fn openai() -> Self {
        Self {
            kind: ProviderKind::OpenAi,
            model: "gpt-4o-mini".to_string(),
            endpoint: None,
            api_key_env: None,
            max_tokens: default_max_tokens(),
        }
    }

    /// Local Ollama model
    pub fn ollama(model: impl Into<String>) -> Self {
        Self {
            kind: ProviderKind::Ollama,
            model: model.into(),
            endpoint: None,
            api_key_env: None,
            max_tokens: default_max_tokens(),
        }
    }

    /// Environment variable consulted for the API key
    pub fn key_env(&self) -> Option<&str> {
        self.api_key_env
            .as_deref()
            .or_else(|| self.kind.default_api_key_env())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err(format!("{} provider model must not be empty", self.kind));
        }
        if self.max_tokens == 0 {
            return Err(format!("{} provider max_tokens must be > 0", self.kind));
        }
        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(format!(
                    "{} provider endpoint must be an http(s) URL, got '{}'",
                    self.kind, endpoint
                ));
            }
        }
        Ok(())
    }
}

/// A provider resolved at startup
#[derive(Clone)]
pub enum ProviderSlot {
    /// Not usable for this run
    Unavailable {
        /// Configured provider name
        name: String,
        /// Why the slot is unavailable
        reason: String,
    },
    /// Ready to take requests
    Configured(Arc<dyn SummaryProvider>),
}

impl ProviderSlot {
    /// Resolve a slot, reading credentials from the process environment
    pub fn resolve(config: &ProviderConfig) -> Self {
        Self::resolve_with(config, |var| std::env::var(var).ok())
    }

    /// Resolve a slot with an explicit credential lookup
    pub fn resolve_with<F>(config: &ProviderConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let name = format!("{}/{}", config.kind, config.model);

        if let Err(reason) = config.validate() {
            return Self::unavailable(name, reason);
        }

        let api_key = match config.key_env() {
            Some(var) => match lookup(var).filter(|k| !k.trim().is_empty()) {
                Some(key) => Some(key),
                None => return Self::unavailable(name, format!("{} is not set", var)),
            },
            None => None,
        };

        let provider: Arc<dyn SummaryProvider> = match config.kind {
            ProviderKind::Anthropic => {
                let mut p = AnthropicProvider::new(api_key.unwrap_or_default(), &config.model);
                if let Some(endpoint) = &config.endpoint {
                    p = p.with_endpoint(endpoint);
                }
                Arc::new(p)
            }
            ProviderKind::OpenAi => {
                let mut p = OpenAiProvider::new(api_key.unwrap_or_default(), &config.model);
                if let Some(endpoint) = &config.endpoint {
                    p = p.with_base_url(endpoint);
                }
                Arc::new(p)
            }
            ProviderKind::Ollama => Arc::new(match &config.endpoint {
                Some(endpoint) => OllamaProvider::new(endpoint, &config.model),
                None => OllamaProvider::default_endpoint(&config.model),
            }),
        };

        Self::Configured(provider)
    }

    /// Wrap an already-built provider
    pub fn configured(provider: impl SummaryProvider + 'static) -> Self {
        Self::Configured(Arc::new(provider))
    }

    /// A slot that is never used
    pub fn unavailable(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// True when the slot can take requests
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Configured(_))
    }

    /// Provider name for logs and stats
    pub fn name(&self) -> &str {
        match self {
            Self::Unavailable { name, .. } => name,
            Self::Configured(provider) => provider.name(),
        }
    }
}

impl fmt::Debug for ProviderSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { name, reason } => f
                .debug_struct("Unavailable")
                .field("name", name)
                .field("reason", reason)
                .finish(),
            Self::Configured(provider) => f.debug_tuple("Configured").field(&provider.name()).finish(),
        }
    }
}
