//! Synthesis errors

use sift_llm::ChainError;
use thiserror::Error;

/// Errors that can occur while synthesizing conclusions
///
/// The synthesizer never lets these abort a run; they are logged and the
/// digest carries empty conclusions instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthesisError {
    /// Synthesis is switched off
    #[error("Conclusion synthesis is disabled")]
    Disabled,

    /// Nothing to synthesize from
    #[error("No summaries to synthesize from")]
    NoInput,

    /// Every provider failed or returned an unusable response
    #[error("Provider error: {0}")]
    Provider(#[from] ChainError),
}
