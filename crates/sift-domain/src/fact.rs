//! Facts analyzed across documents

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Category a fact lands in after analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactCategory {
    /// Stated by many documents
    Common,
    /// Stated once, built from distinctive vocabulary
    Unusual,
    /// Unusually long statement
    Long,
}

impl fmt::Display for FactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactCategory::Common => write!(f, "common"),
            FactCategory::Unusual => write!(f, "unusual"),
            FactCategory::Long => write!(f, "long"),
        }
    }
}

/// A fact grouped by its normalized text across all summaries
///
/// Frequency is recomputed on every run, never accumulated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedFact {
    /// Canonical text with citation markers stripped
    pub text: String,

    /// Distinct documents stating the fact
    pub sources: BTreeSet<String>,

    /// Number of distinct documents stating the fact
    pub frequency: usize,

    /// Distinctiveness score in [0, 1]
    pub rarity: f64,

    /// Whitespace-separated word count of `text`
    pub word_count: usize,

    /// Assigned category, if any
    pub category: Option<FactCategory>,
}

/// The three ranked fact lists produced by fact analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactReport {
    /// frequency ≥ threshold, most frequent first
    pub common: Vec<AnalyzedFact>,

    /// Single-document facts with high rarity, rarest first
    pub unusual: Vec<AnalyzedFact>,

    /// Long facts, longest first
    pub long: Vec<AnalyzedFact>,

    /// Number of distinct facts seen before categorization
    pub total_facts: usize,
}

impl FactReport {
    /// Iterate over every categorized fact
    pub fn iter(&self) -> impl Iterator<Item = &AnalyzedFact> {
        self.common
            .iter()
            .chain(self.unusual.iter())
            .chain(self.long.iter())
    }

    /// True when no fact was categorized
    pub fn is_empty(&self) -> bool {
        self.common.is_empty() && self.unusual.is_empty() && self.long.is_empty()
    }
}
