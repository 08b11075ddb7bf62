//! Types for gateway results and accounting

use serde::{Deserialize, Serialize};
use sift_domain::{DocumentSummary, CHARS_PER_TOKEN};
use std::collections::BTreeMap;

/// One file's entry in a provider response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileResult {
    /// Short summary
    pub summary: String,

    /// Facts, expected to carry `[source: path:line]`
    pub key_facts: Vec<String>,

    /// Insights, expected to carry `[source: path]`
    pub insights: Vec<String>,

    /// Statistics with values stringified
    pub statistics: BTreeMap<String, String>,

    /// Referenced sources
    pub sources: Vec<String>,
}

impl FileResult {
    /// Characters of generated text in this entry
    pub fn char_len(&self) -> usize {
        let text = self.summary.chars().count()
            + self
                .key_facts
                .iter()
                .chain(self.insights.iter())
                .chain(self.sources.iter())
                .map(|s| s.chars().count())
                .sum::<usize>();
        let stats: usize = self
            .statistics
            .iter()
            .map(|(k, v)| k.chars().count() + v.chars().count())
            .sum();
        text + stats
    }

    /// Estimated tokens when the provider reports no usage
    pub fn estimated_tokens(&self) -> u32 {
        u32::try_from(self.char_len() / CHARS_PER_TOKEN).unwrap_or(u32::MAX)
    }

    /// Convert into a summary for `document`; confidence is recomputed
    pub fn into_summary(self, document: &str, model: &str, token_count: u32) -> DocumentSummary {
        let mut summary = DocumentSummary::new(document, self.summary, self.key_facts, self.insights);
        summary.statistics = self.statistics;
        summary.sources = self.sources;
        summary.model = model.to_string();
        summary.token_count = token_count;
        summary
    }
}

/// Counters kept by the gateway across a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayStats {
    /// Batches that returned summaries
    pub batches_summarized: usize,

    /// Batches answered by the fallback provider
    pub fallback_batches: usize,

    /// Batches where every provider failed
    pub failed_batches: usize,

    /// Tokens attributed to summaries
    pub total_tokens: u64,
}

/// Split `total` tokens evenly across `count` documents
///
/// The remainder goes to the first documents so the parts sum to `total`.
pub fn split_tokens(total: u32, count: usize) -> Vec<u32> {
    if count == 0 {
        return Vec::new();
    }
    let count_u32 = u32::try_from(count).unwrap_or(u32::MAX);
    let base = total / count_u32;
    let remainder = (total % count_u32) as usize;
    (0..count)
        .map(|i| base + u32::from(i < remainder))
        .collect()
}
