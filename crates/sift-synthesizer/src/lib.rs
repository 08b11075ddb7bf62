//! Sift Synthesizer
//!
//! Draws strategic conclusions across a whole run with a single
//! structured-output request through the shared provider chain. Synthesis
//! is optional and never fatal: when it is disabled or every provider
//! fails, the digest simply carries empty conclusions.
//!
//! # Example
//!
//! ```no_run
//! use sift_domain::FactReport;
//! use sift_llm::{MockProvider, ProviderChain, ProviderSlot};
//! use sift_synthesizer::{ConclusionSynthesizer, SynthesisConfig, SynthesisInput};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let chain = Arc::new(ProviderChain::new(
//!     ProviderSlot::configured(MockProvider::new(r#"{"conclusions": ["Hiring is accelerating"]}"#)),
//!     ProviderSlot::unavailable("openai/gpt-4o-mini", "OPENAI_API_KEY is not set"),
//! ));
//! let synthesizer = ConclusionSynthesizer::new(chain, SynthesisConfig::default());
//!
//! let facts = FactReport::default();
//! let conclusions = synthesizer.synthesize(&SynthesisInput::new(&[], &facts)).await;
//! assert!(conclusions.is_empty());
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod parser;
mod prompt;
mod synthesizer;

pub use config::SynthesisConfig;
pub use error::SynthesisError;
pub use parser::{parse_conclusions, RawConclusions};
pub use prompt::{build_request, SynthesisInput, CONCLUSIONS_SCHEMA};
pub use synthesizer::ConclusionSynthesizer;
