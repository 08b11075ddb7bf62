//! Summarization gateway: one provider request per batch

use crate::config::BatchConfig;
use crate::error::BatchError;
use crate::parser::parse_batch_response;
use crate::prompt::BatchPromptBuilder;
use crate::types::{split_tokens, GatewayStats};
use sift_domain::{DocumentSummary, WorkBatch};
use sift_llm::ProviderChain;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Sends batches to the provider chain and turns responses into summaries
///
/// Returns exactly one summary per input document, in input order, or an
/// error. A batch is never partially summarized.
pub struct SummarizationGateway {
    chain: Arc<ProviderChain>,
    prompts: BatchPromptBuilder,
    batches_summarized: AtomicUsize,
    fallback_batches: AtomicUsize,
    failed_batches: AtomicUsize,
    total_tokens: AtomicU64,
}

impl SummarizationGateway {
    /// Create a new gateway over a shared provider chain
    pub fn new(chain: Arc<ProviderChain>, config: &BatchConfig) -> Self {
        Self {
            chain,
            prompts: BatchPromptBuilder::new(config.max_document_chars),
            batches_summarized: AtomicUsize::new(0),
            fallback_batches: AtomicUsize::new(0),
            failed_batches: AtomicUsize::new(0),
            total_tokens: AtomicU64::new(0),
        }
    }

    /// Set the generation budget for every batch request
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.prompts = self.prompts.with_max_tokens(max_tokens);
        self
    }

    /// Provider chain used by this gateway
    pub fn chain(&self) -> &Arc<ProviderChain> {
        &self.chain
    }

    /// Summarize every document in a batch
    pub async fn summarize_batch(
        &self,
        batch: &WorkBatch,
    ) -> Result<Vec<DocumentSummary>, BatchError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let paths = batch.paths();
        let request = self.prompts.build(batch);

        debug!(
            batch = %batch.id,
            documents = batch.len(),
            prompt_chars = request.prompt.len(),
            "Sending batch"
        );

        let routed = match self
            .chain
            .complete_with(&request, |completion| {
                parse_batch_response(&completion.text, &paths).map_err(|e| e.to_string())
            })
            .await
        {
            Ok(routed) => routed,
            Err(e) => {
                self.failed_batches.fetch_add(1, Ordering::Relaxed);
                error!(batch = %batch.id, error = %e, "Batch failed on every provider");
                return Err(BatchError::Provider(e));
            }
        };

        let token_counts = match routed.tokens_used {
            Some(total) => split_tokens(total, routed.value.len()),
            None => routed.value.iter().map(|r| r.estimated_tokens()).collect(),
        };

        let summaries: Vec<DocumentSummary> = routed
            .value
            .into_iter()
            .zip(paths.iter())
            .zip(token_counts)
            .map(|((result, path), tokens)| result.into_summary(path, &routed.model, tokens))
            .collect();

        let batch_tokens: u64 = summaries.iter().map(|s| u64::from(s.token_count)).sum();
        self.total_tokens.fetch_add(batch_tokens, Ordering::Relaxed);
        self.batches_summarized.fetch_add(1, Ordering::Relaxed);
        if routed.used_fallback {
            self.fallback_batches.fetch_add(1, Ordering::Relaxed);
        }

        info!(
            batch = %batch.id,
            documents = summaries.len(),
            provider = %routed.provider,
            fallback = routed.used_fallback,
            tokens = batch_tokens,
            "Batch summarized"
        );

        Ok(summaries)
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> GatewayStats {
        GatewayStats {
            batches_summarized: self.batches_summarized.load(Ordering::Relaxed),
            fallback_batches: self.fallback_batches.load(Ordering::Relaxed),
            failed_batches: self.failed_batches.load(Ordering::Relaxed),
            total_tokens: self.total_tokens.load(Ordering::Relaxed),
        }
    }
}
