//! Error types for batching and summarization

use sift_llm::ChainError;
use thiserror::Error;

/// Errors that can occur while batching or summarizing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BatchError {
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Every provider failed for a batch
    #[error("Provider error: {0}")]
    Provider(#[from] ChainError),

    /// Response did not follow the requested schema
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
}
