//! Primary/fallback provider routing
//!
//! The chain tries the primary slot, then the fallback slot with the
//! identical request. A failure is anything that keeps a usable value from
//! coming back: a transport error, a non-success status, a timeout, or a
//! response the caller's parser rejects. Both slots failing is fatal for
//! the request; there is no third attempt and no partial result.

use crate::{Completion, CompletionRequest, LlmError, ProviderSlot};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Default per-call timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// One failed attempt within a chain call
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderFailure {
    /// Provider that failed
    pub provider: String,
    /// What went wrong
    pub message: String,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.message)
    }
}

/// Errors returned by [`ProviderChain`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainError {
    /// Neither slot is configured
    #[error("No summarization provider is configured")]
    NoProviders,

    /// Every configured provider failed
    #[error("All providers failed: {}", describe(.attempts))]
    Exhausted {
        /// Every attempt in call order
        attempts: Vec<ProviderFailure>,
    },
}

fn describe(attempts: &[ProviderFailure]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A parsed value plus where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Routed<T> {
    /// Parsed value
    pub value: T,
    /// Provider that produced it
    pub provider: String,
    /// Model reported by the provider
    pub model: String,
    /// Tokens reported by the provider
    pub tokens_used: Option<u32>,
    /// True when the fallback slot answered
    pub used_fallback: bool,
}

/// Routes requests to the primary provider, then the fallback
#[derive(Debug)]
pub struct ProviderChain {
    primary: ProviderSlot,
    fallback: ProviderSlot,
    timeout: Duration,
    primary_failures: AtomicUsize,
}

impl ProviderChain {
    /// Create a chain from two resolved slots
    pub fn new(primary: ProviderSlot, fallback: ProviderSlot) -> Self {
        Self {
            primary,
            fallback,
            timeout: DEFAULT_TIMEOUT,
            primary_failures: AtomicUsize::new(0),
        }
    }

    /// Set the per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Per-call timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Primary slot
    pub fn primary(&self) -> &ProviderSlot {
        &self.primary
    }

    /// Fallback slot
    pub fn fallback(&self) -> &ProviderSlot {
        &self.fallback
    }

    /// True when at least one slot is configured
    pub fn has_provider(&self) -> bool {
        self.primary.is_available() || self.fallback.is_available()
    }

    /// How many calls the configured primary failed so far
    pub fn primary_failures(&self) -> usize {
        self.primary_failures.load(Ordering::Relaxed)
    }

    /// Run a request and return the raw completion
    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<Routed<Completion>, ChainError> {
        self.complete_with(request, |completion| Ok(completion.clone()))
            .await
    }

    /// Run a request, accepting the first completion `parse` accepts
    pub async fn complete_with<T, F>(
        &self,
        request: &CompletionRequest,
        parse: F,
    ) -> Result<Routed<T>, ChainError>
    where
        F: Fn(&Completion) -> Result<T, String>,
    {
        if !self.has_provider() {
            return Err(ChainError::NoProviders);
        }

        let mut attempts = Vec::new();

        for (slot, is_fallback) in [(&self.primary, false), (&self.fallback, true)] {
            let provider = match slot {
                ProviderSlot::Configured(provider) => provider,
                ProviderSlot::Unavailable { name, reason } => {
                    debug!(provider = %name, reason = %reason, "Skipping unavailable provider");
                    continue;
                }
            };

            let outcome = match tokio::time::timeout(self.timeout, provider.complete(request)).await
            {
                Ok(Ok(completion)) => parse(&completion)
                    .map(|value| (value, completion))
                    .map_err(|e| format!("Unusable response: {}", e)),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_) => Err(LlmError::Timeout(self.timeout).to_string()),
            };

            match outcome {
                Ok((value, completion)) => {
                    debug!(
                        provider = %provider.name(),
                        chars = completion.text.len(),
                        fallback = is_fallback,
                        "Provider call succeeded"
                    );
                    return Ok(Routed {
                        value,
                        provider: provider.name().to_string(),
                        model: completion.model,
                        tokens_used: completion.tokens_used,
                        used_fallback: is_fallback,
                    });
                }
                Err(message) => {
                    if !is_fallback {
                        self.primary_failures.fetch_add(1, Ordering::Relaxed);
                    }
                    warn!(
                        provider = %provider.name(),
                        error = %message,
                        fallback = is_fallback,
                        "Provider call failed"
                    );
                    attempts.push(ProviderFailure {
                        provider: provider.name().to_string(),
                        message,
                    });
                }
            }
        }

        Err(ChainError::Exhausted { attempts })
    }
}
