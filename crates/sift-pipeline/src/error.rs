//! Pipeline errors

use crate::config::ConfigError;
use sift_batcher::BatchError;
use std::fmt;
use thiserror::Error;

/// Stage of the run that can abort it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Splitting documents into batches
    Partition,
    /// Summarizing batches through the provider chain
    Summarize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Partition => write!(f, "partition"),
            Stage::Summarize => write!(f, "summarize"),
        }
    }
}

/// Errors that abort a run
///
/// Analysis, clustering and synthesis failures degrade instead of showing
/// up here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The upstream sequence was empty
    #[error("No documents to process")]
    NoInput,

    /// A stage failed
    #[error("{stage} stage failed: {source}")]
    Stage {
        /// Failing stage
        stage: Stage,
        /// Underlying error
        source: BatchError,
    },

    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PipelineError {
    /// Wrap a stage failure
    pub fn stage(stage: Stage, source: BatchError) -> Self {
        PipelineError::Stage { stage, source }
    }

    /// Failing stage, if the error came from one
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
