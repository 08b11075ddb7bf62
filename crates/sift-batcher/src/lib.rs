//! Sift Batcher
//!
//! Partitions documents into bounded batches, summarizes each batch with a
//! single structured-output request, and schedules batches with a fixed
//! concurrency cap.
//!
//! # Architecture
//!
//! ```text
//! Documents → partition → [WorkBatch] → run_batches(C) → SummarizationGateway
//!                                                              ↓
//!                                              ProviderChain (primary → fallback)
//!                                                              ↓
//!                                                     [DocumentSummary]
//! ```
//!
//! # Key Features
//!
//! - **Order-preserving partitioning**: contiguous batches, nothing dropped
//! - **One request per batch**: every document of a batch in one prompt,
//!   truncated per document to a character cap
//! - **Strict parsing**: schema violations are failures and trigger fallback
//! - **Citation-derived confidence**: never trusted from the provider
//! - **Bounded concurrency**: groups of at most C batches, awaited as a whole
//!
//! # Example Usage
//!
//! ```no_run
//! use sift_batcher::{partition, run_batches, BatchConfig, SummarizationGateway};
//! use sift_domain::ExtractedDocument;
//! use sift_llm::{MockProvider, ProviderChain, ProviderSlot};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BatchConfig::default();
//! let chain = Arc::new(ProviderChain::new(
//!     ProviderSlot::configured(MockProvider::new("{}")),
//!     ProviderSlot::unavailable("openai/gpt-4o-mini", "OPENAI_API_KEY is not set"),
//! ));
//! let gateway = SummarizationGateway::new(chain, &config);
//!
//! let docs = vec![ExtractedDocument::new("notes/today.md", "Alice joined Acme Corp.")];
//! let batches = partition(docs, config.batch_size)?;
//! let summaries = run_batches(&batches, config.concurrency, |batch| {
//!     gateway.summarize_batch(batch)
//! })
//! .await?;
//!
//! println!("Summarized {} documents", summaries.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod gateway;
mod parser;
mod partition;
mod prompt;
mod scheduler;
mod types;

#[cfg(test)]
mod tests;

pub use config::BatchConfig;
pub use error::BatchError;
pub use gateway::SummarizationGateway;
pub use parser::parse_batch_response;
pub use partition::partition;
pub use prompt::{truncate, BatchPromptBuilder, RESPONSE_SCHEMA, TRUNCATION_MARKER};
pub use scheduler::run_batches;
pub use types::{split_tokens, FileResult, GatewayStats};
