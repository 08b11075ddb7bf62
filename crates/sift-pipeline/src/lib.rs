//! Sift Pipeline
//!
//! Orchestrates one digest run over a set of recently modified documents:
//!
//! ```text
//! documents → partition → run_batches(C) ─ SummarizationGateway ─ ProviderChain
//!                                  ↓
//!                            FactAnalyzer
//!                                  ↓
//!              [large collection] KnowledgeGraphBuilder → SemanticClusterer
//!                                  ↓
//!                        ConclusionSynthesizer → Digest
//! ```
//!
//! Only partitioning and summarization can abort a run. Analysis stages
//! degrade (a single trivial cluster, empty conclusions) instead of failing.

#![warn(missing_docs)]

pub mod config;
pub mod digest;
pub mod error;
pub mod pipeline;

pub use config::{ConfigError, PipelineConfig};
pub use digest::{AnalysisMode, Digest, GraphAnalysis, RunStats};
pub use error::{PipelineError, Stage};
pub use pipeline::Pipeline;
