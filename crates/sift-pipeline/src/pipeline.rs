//! Run orchestration

use crate::config::PipelineConfig;
use crate::digest::{AnalysisMode, Digest, GraphAnalysis, RunStats};
use crate::error::{PipelineError, Stage};
use sift_analysis::{FactAnalyzer, KnowledgeGraphBuilder, SemanticClusterer};
use sift_batcher::{partition, run_batches, SummarizationGateway};
use sift_domain::{Conclusions, DocumentSummary, ExtractedDocument, FactReport};
use sift_llm::{ProviderChain, ProviderSlot};
use sift_synthesizer::{ConclusionSynthesizer, SynthesisInput};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Entities passed to the synthesizer in graph mode
const TOP_ENTITIES: usize = 10;

/// The digest pipeline
///
/// Partition → summarize (bounded concurrency, primary/fallback) → fact
/// analysis → graph and clusters when the collection is large → conclusions.
pub struct Pipeline {
    config: PipelineConfig,
    chain: Arc<ProviderChain>,
}

impl Pipeline {
    /// Validate `config` and resolve both provider slots from the environment
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;

        let primary = ProviderSlot::resolve(&config.primary);
        let fallback = match &config.fallback {
            Some(fallback) => ProviderSlot::resolve(fallback),
            None => ProviderSlot::unavailable("fallback", "no fallback provider configured"),
        };
        for (role, slot) in [("primary", &primary), ("fallback", &fallback)] {
            match slot {
                ProviderSlot::Configured(_) => info!(role, provider = %slot.name(), "Provider ready"),
                ProviderSlot::Unavailable { reason, .. } => {
                    warn!(role, provider = %slot.name(), reason = %reason, "Provider unavailable")
                }
            }
        }

        let chain = ProviderChain::new(primary, fallback).with_timeout(config.batch.timeout());
        Self::with_chain(config, Arc::new(chain))
    }

    /// Use an already-built provider chain
    pub fn with_chain(
        config: PipelineConfig,
        chain: Arc<ProviderChain>,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config, chain })
    }

    /// Configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Shared provider chain
    pub fn chain(&self) -> &Arc<ProviderChain> {
        &self.chain
    }

    /// Branch a run over `documents` would take
    pub fn analysis_mode(&self, documents: &[ExtractedDocument]) -> AnalysisMode {
        if self.config.graph.should_build(documents) {
            AnalysisMode::Graph
        } else {
            AnalysisMode::Standard
        }
    }

    /// Process `documents` into a digest
    pub async fn run(&self, documents: Vec<ExtractedDocument>) -> Result<Digest, PipelineError> {
        let started = Instant::now();
        if documents.is_empty() {
            return Err(PipelineError::NoInput);
        }

        let document_count = documents.len();
        let mode = self.analysis_mode(&documents);
        info!(documents = document_count, mode = %mode, "Starting run");

        // Partitioning consumes the documents; keep a copy for entity tagging
        let graph_documents = match mode {
            AnalysisMode::Graph => documents.clone(),
            AnalysisMode::Standard => Vec::new(),
        };

        let batches = partition(documents, self.config.batch.batch_size)
            .map_err(|e| PipelineError::stage(Stage::Partition, e))?;

        let gateway = SummarizationGateway::new(Arc::clone(&self.chain), &self.config.batch)
            .with_max_tokens(self.config.primary.max_tokens);
        let summaries = run_batches(&batches, self.config.batch.concurrency, |batch| {
            gateway.summarize_batch(batch)
        })
        .await
        .map_err(|e| {
            error!(error = %e, "Summarization failed, aborting run");
            PipelineError::stage(Stage::Summarize, e)
        })?;

        let facts = FactAnalyzer::new(self.config.facts.clone()).analyze(&summaries);

        let graph = match mode {
            AnalysisMode::Graph => Some(self.analyze_graph(&graph_documents)),
            AnalysisMode::Standard => None,
        };

        let conclusions = self.synthesize(&summaries, &facts, graph.as_ref()).await;

        let gateway_stats = gateway.stats();
        let stats = RunStats {
            documents: document_count,
            batches: batches.len(),
            summaries: summaries.len(),
            total_tokens: gateway_stats.total_tokens,
            mean_confidence: mean_confidence(&summaries),
            elapsed_ms: started.elapsed().as_millis() as u64,
            primary_failures: self.chain.primary_failures(),
            fallback_batches: gateway_stats.fallback_batches,
        };

        info!(
            documents = stats.documents,
            batches = stats.batches,
            tokens = stats.total_tokens,
            elapsed_ms = stats.elapsed_ms,
            "Run complete"
        );

        Ok(Digest {
            summaries,
            facts,
            mode,
            graph,
            conclusions,
            stats,
        })
    }

    fn analyze_graph(&self, documents: &[ExtractedDocument]) -> GraphAnalysis {
        let graph = KnowledgeGraphBuilder::default().build(documents);
        let clusters = SemanticClusterer::new(self.config.cluster.clone()).cluster(&graph.nodes);
        GraphAnalysis { graph, clusters }
    }

    async fn synthesize(
        &self,
        summaries: &[DocumentSummary],
        facts: &FactReport,
        graph: Option<&GraphAnalysis>,
    ) -> Option<Conclusions> {
        if !self.config.synthesis.enabled {
            return None;
        }

        let (entities, themes): (Vec<String>, Vec<String>) = match graph {
            Some(analysis) => (
                analysis
                    .graph
                    .top_entities(TOP_ENTITIES)
                    .into_iter()
                    .map(|n| n.label.clone())
                    .collect(),
                analysis.clusters.iter().map(|c| c.label.clone()).collect(),
            ),
            None => (Vec::new(), Vec::new()),
        };

        let input = SynthesisInput::new(summaries, facts).with_graph(&entities, &themes);
        let synthesizer =
            ConclusionSynthesizer::new(Arc::clone(&self.chain), self.config.synthesis.clone());
        Some(synthesizer.synthesize(&input).await)
    }
}

fn mean_confidence(summaries: &[DocumentSummary]) -> f64 {
    if summaries.is_empty() {
        return 0.0;
    }
    summaries.iter().map(|s| s.confidence).sum::<f64>() / summaries.len() as f64
}
