//! The digest produced by a run

use serde::{Deserialize, Serialize};
use sift_domain::{Conclusions, DocumentSummary, EntityCluster, FactReport, KnowledgeGraph};
use std::fmt;

/// Which analysis branch a run took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Summaries and fact analysis only
    Standard,
    /// Standard analysis plus knowledge graph and clusters
    Graph,
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisMode::Standard => write!(f, "standard"),
            AnalysisMode::Graph => write!(f, "graph"),
        }
    }
}

/// Graph branch output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphAnalysis {
    /// Entity co-occurrence graph
    pub graph: KnowledgeGraph,
    /// Clusters over the graph's nodes
    pub clusters: Vec<EntityCluster>,
}

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Documents received
    pub documents: usize,
    /// Batches sent
    pub batches: usize,
    /// Summaries produced
    pub summaries: usize,
    /// Tokens attributed to summaries
    pub total_tokens: u64,
    /// Mean citation-derived confidence
    pub mean_confidence: f64,
    /// Wall-clock duration of the run
    pub elapsed_ms: u64,
    /// Failed calls on the primary provider
    pub primary_failures: usize,
    /// Batches answered by the fallback provider
    pub fallback_batches: usize,
}

/// Everything a run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Digest {
    /// One summary per document, in input order
    pub summaries: Vec<DocumentSummary>,
    /// Categorized facts
    pub facts: FactReport,
    /// Branch taken
    pub mode: AnalysisMode,
    /// Present in graph mode
    pub graph: Option<GraphAnalysis>,
    /// Present when synthesis is enabled; empty when it failed
    pub conclusions: Option<Conclusions>,
    /// Run counters
    pub stats: RunStats,
}

impl Digest {
    /// Summary for a document path
    pub fn summary_for(&self, path: &str) -> Option<&DocumentSummary> {
        self.summaries.iter().find(|s| s.document == path)
    }
}
