//! Analysis errors

use thiserror::Error;

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors raised inside the analytical stages
///
/// None of these abort a run: callers fall back to a degraded result
/// (the trivial cluster, for instance) and log the cause.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalysisError {
    /// No usable words left after tokenization
    #[error("Empty vocabulary: no node label produced a usable term")]
    EmptyVocabulary,

    /// A computation produced NaN or infinity
    #[error("Numeric failure: {0}")]
    Numeric(String),

    /// Invalid analysis configuration
    #[error("Configuration error: {0}")]
    Config(String),
}
