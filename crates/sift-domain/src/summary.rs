//! Per-document summaries and citation-derived confidence

use crate::provenance::has_citation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of one document produced by a summarization provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Path of the summarized document
    pub document: String,

    /// Prose summary
    pub summary: String,

    /// Key facts, each expected to carry `[source: path[:line]]`
    pub key_facts: Vec<String>,

    /// Insights, each expected to carry `[source: path]`
    pub insights: Vec<String>,

    /// Extracted statistics (name → value)
    pub statistics: BTreeMap<String, String>,

    /// Sources the provider reports having used
    pub sources: Vec<String>,

    /// Provider/model identifier, e.g. `anthropic/claude-sonnet`
    pub model: String,

    /// Tokens attributed to this document
    pub token_count: u32,

    /// Share of facts and insights carrying a citation, in [0, 1]
    pub confidence: f64,
}

impl DocumentSummary {
    /// Create a summary; confidence is derived from the facts and insights
    pub fn new(
        document: impl Into<String>,
        summary: impl Into<String>,
        key_facts: Vec<String>,
        insights: Vec<String>,
    ) -> Self {
        let confidence = compute_confidence(&key_facts, &insights);
        Self {
            document: document.into(),
            summary: summary.into(),
            key_facts,
            insights,
            statistics: BTreeMap::new(),
            sources: Vec::new(),
            model: String::new(),
            token_count: 0,
            confidence,
        }
    }

    /// Recompute `confidence` from the current facts and insights
    pub fn refresh_confidence(&mut self) {
        self.confidence = compute_confidence(&self.key_facts, &self.insights);
    }

    /// Number of facts and insights carrying a citation marker
    pub fn cited_count(&self) -> usize {
        self.key_facts
            .iter()
            .chain(self.insights.iter())
            .filter(|s| has_citation(s))
            .count()
    }
}

/// Confidence = cited (facts + insights) / total (facts + insights)
///
/// Returns 0.0 when there are no facts and no insights.
///
/// # Examples
///
/// ```
/// use sift_domain::compute_confidence;
///
/// let facts = vec!["A [source: a.md:1]".to_string(), "B".to_string()];
/// assert_eq!(compute_confidence(&facts, &[]), 0.5);
/// assert_eq!(compute_confidence(&[], &[]), 0.0);
/// ```
pub fn compute_confidence(key_facts: &[String], insights: &[String]) -> f64 {
    let total = key_facts.len() + insights.len();
    if total == 0 {
        return 0.0;
    }
    let cited = key_facts
        .iter()
        .chain(insights.iter())
        .filter(|s| has_citation(s))
        .count();
    cited as f64 / total as f64
}
