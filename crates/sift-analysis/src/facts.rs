//! Cross-document fact analysis
//!
//! Groups the key facts of every summary by normalized text, scores their
//! vocabulary with TF-IDF, and sorts them into three ranked lists. The
//! categories are assigned in priority order common → unusual → long: a fact
//! that qualifies for an earlier category never appears in a later one,
//! even when it was cut from the earlier list by its limit.

use crate::text::tokenize;
use crate::tfidf::TfIdfIndex;
use serde::{Deserialize, Serialize};
use sift_domain::provenance::strip_citations;
use sift_domain::{AnalyzedFact, DocumentSummary, FactCategory, FactReport};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Category thresholds for fact analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactThresholds {
    /// Minimum distinct documents for a common fact
    pub common_min_frequency: usize,

    /// Maximum common facts reported
    pub common_limit: usize,

    /// Minimum rarity for an unusual (single-document) fact
    pub unusual_min_rarity: f64,

    /// Maximum unusual facts reported
    pub unusual_limit: usize,

    /// Facts with more words than this are long
    pub long_min_words: usize,
}

impl Default for FactThresholds {
    fn default() -> Self {
        Self {
            common_min_frequency: 3,
            common_limit: 10,
            unusual_min_rarity: 0.7,
            unusual_limit: 10,
            long_min_words: 50,
        }
    }
}

impl FactThresholds {
    /// Aggressive preset: report more facts
    pub fn aggressive() -> Self {
        Self {
            common_min_frequency: 2,
            common_limit: 20,
            unusual_min_rarity: 0.5,
            unusual_limit: 20,
            long_min_words: 30,
        }
    }

    /// Lenient preset: report only strong signals
    pub fn lenient() -> Self {
        Self {
            common_min_frequency: 4,
            common_limit: 5,
            unusual_min_rarity: 0.85,
            unusual_limit: 5,
            long_min_words: 80,
        }
    }

    /// Validate the thresholds
    pub fn validate(&self) -> Result<(), String> {
        if self.common_min_frequency < 2 {
            return Err("common_min_frequency must be at least 2".to_string());
        }
        if !(0.0..=1.0).contains(&self.unusual_min_rarity) {
            return Err("unusual_min_rarity must be between 0.0 and 1.0".to_string());
        }
        Ok(())
    }
}

/// Computes frequency and rarity for facts across all summaries
#[derive(Debug, Clone, Default)]
pub struct FactAnalyzer {
    thresholds: FactThresholds,
}

struct FactGroup {
    text: String,
    sources: BTreeSet<String>,
}

impl FactAnalyzer {
    /// Create an analyzer with the given thresholds
    pub fn new(thresholds: FactThresholds) -> Self {
        Self { thresholds }
    }

    /// Thresholds in use
    pub fn thresholds(&self) -> &FactThresholds {
        &self.thresholds
    }

    /// Group, score and categorize every key fact
    pub fn analyze(&self, summaries: &[DocumentSummary]) -> FactReport {
        let facts = self.score(summaries);
        let total_facts = facts.len();
        let t = &self.thresholds;

        let is_common = |f: &AnalyzedFact| f.frequency >= t.common_min_frequency;
        let is_unusual = |f: &AnalyzedFact| f.frequency == 1 && f.rarity >= t.unusual_min_rarity;
        let is_long = |f: &AnalyzedFact| f.word_count > t.long_min_words;

        let mut common: Vec<AnalyzedFact> = facts.iter().filter(|f| is_common(f)).cloned().collect();
        common.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.text.cmp(&b.text)));
        common.truncate(t.common_limit);

        let mut unusual: Vec<AnalyzedFact> = facts
            .iter()
            .filter(|f| !is_common(f) && is_unusual(f))
            .cloned()
            .collect();
        unusual.sort_by(|a, b| {
            b.rarity
                .partial_cmp(&a.rarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.text.cmp(&b.text))
        });
        unusual.truncate(t.unusual_limit);

        let mut long: Vec<AnalyzedFact> = facts
            .iter()
            .filter(|f| !is_common(f) && !is_unusual(f) && is_long(f))
            .cloned()
            .collect();
        long.sort_by(|a, b| b.word_count.cmp(&a.word_count).then_with(|| a.text.cmp(&b.text)));

        set_category(&mut common, FactCategory::Common);
        set_category(&mut unusual, FactCategory::Unusual);
        set_category(&mut long, FactCategory::Long);

        info!(
            total = total_facts,
            common = common.len(),
            unusual = unusual.len(),
            long = long.len(),
            "Fact analysis complete"
        );

        FactReport {
            common,
            unusual,
            long,
            total_facts,
        }
    }

    /// Every distinct fact with frequency and rarity, in first-seen order
    pub fn score(&self, summaries: &[DocumentSummary]) -> Vec<AnalyzedFact> {
        let groups = group_facts(summaries);

        let corpus: Vec<Vec<String>> = groups.iter().map(|g| tokenize(&g.text)).collect();
        let index = TfIdfIndex::build(&corpus);
        debug!(facts = groups.len(), "Built fact TF-IDF index");

        groups
            .into_iter()
            .zip(corpus.iter())
            .map(|(group, tokens)| {
                let rarity = index
                    .average_score(tokens)
                    .map(|avg| 1.0 / (1.0 + avg))
                    .unwrap_or(0.0);
                AnalyzedFact {
                    word_count: group.text.split_whitespace().count(),
                    frequency: group.sources.len(),
                    text: group.text,
                    sources: group.sources,
                    rarity,
                    category: None,
                }
            })
            .collect()
    }
}

/// Grouping key: markers stripped, whitespace collapsed, case-folded
pub fn fact_key(fact: &str) -> String {
    strip_citations(fact)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn group_facts(summaries: &[DocumentSummary]) -> Vec<FactGroup> {
    let mut groups: Vec<FactGroup> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for summary in summaries {
        for fact in &summary.key_facts {
            let key = fact_key(fact);
            if key.is_empty() {
                continue;
            }
            let idx = *by_key.entry(key).or_insert_with(|| {
                groups.push(FactGroup {
                    text: strip_citations(fact),
                    sources: BTreeSet::new(),
                });
                groups.len() - 1
            });
            groups[idx].sources.insert(summary.document.clone());
        }
    }

    groups
}

fn set_category(facts: &mut [AnalyzedFact], category: FactCategory) {
    for fact in facts {
        fact.category = Some(category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(path: &str, facts: &[&str]) -> DocumentSummary {
        DocumentSummary::new(
            path,
            "summary",
            facts.iter().map(|f| f.to_string()).collect(),
            Vec::new(),
        )
    }

    #[test]
    fn test_fact_in_three_documents_is_common() {
        let summaries = vec![
            summary("a.md", &["Acme ships product X [source: a.md:4]"]),
            summary("b.md", &["acme ships   product x [source: b.md:9]"]),
            summary("c.md", &["Acme ships product X"]),
        ];
        let report = FactAnalyzer::default().analyze(&summaries);

        assert_eq!(report.common.len(), 1);
        let fact = &report.common[0];
        assert_eq!(fact.frequency, 3);
        assert_eq!(fact.text, "Acme ships product X");
        assert_eq!(fact.sources.len(), 3);
        assert_eq!(fact.category, Some(FactCategory::Common));
        assert_eq!(report.total_facts, 1);
    }

    #[test]
    fn test_repeats_in_one_document_count_once() {
        let summaries = vec![summary("a.md", &["Budget approved", "budget approved"])];
        let facts = FactAnalyzer::default().score(&summaries);
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].frequency, 1);
    }

    #[test]
    fn test_single_document_fact_with_shared_vocabulary_is_unusual() {
        let summaries = vec![
            summary("a.md", &["Acme ships widgets"]),
            summary("b.md", &["Acme ships widgets"]),
            summary("c.md", &["Acme ships widgets"]),
            summary("d.md", &["Acme ships gadgets"]),
        ];
        let report = FactAnalyzer::default().analyze(&summaries);

        // Two distinct facts; "gadgets" scores ln 2 and the rest 0, so
        // rarity = 1 / (1 + ln2 / 3) ≈ 0.81
        assert_eq!(report.unusual.len(), 1);
        assert_eq!(report.unusual[0].text, "Acme ships gadgets");
        assert!(report.unusual[0].rarity > 0.8);
        assert_eq!(report.common.len(), 1);
    }

    #[test]
    fn test_two_document_low_rarity_fact_is_uncategorized() {
        let summaries = vec![
            summary("a.md", &["Acme ships product X [source: a.md:4]", "Quarterly revenue doubled"]),
            summary("b.md", &["Acme ships product X [source: b.md:2]", "Office relocated downtown"]),
            summary("c.md", &["Warehouse staffing increased sharply"]),
        ];
        let report = FactAnalyzer::default().analyze(&summaries);

        assert!(report.common.is_empty());
        assert!(report.iter().all(|f| f.text != "Acme ships product X"));
        assert_eq!(report.total_facts, 4);
    }

    #[test]
    fn test_categories_are_mutually_exclusive() {
        let long_fact = vec!["word"; 60].join(" ");
        let other_fact = vec!["other"; 55].join(" ");
        let summaries = vec![
            summary("a.md", &[long_fact.as_str()]),
            summary("b.md", &[long_fact.as_str()]),
            summary("c.md", &[long_fact.as_str()]),
            summary("d.md", &[other_fact.as_str()]),
        ];
        let report = FactAnalyzer::default().analyze(&summaries);

        // The 60-word fact is common and therefore not long
        assert_eq!(report.common.len(), 1);
        assert!(report.long.iter().all(|f| f.frequency < 3));

        let mut seen = BTreeSet::new();
        for fact in report.iter() {
            assert!(seen.insert(fact.text.clone()), "duplicate: {}", fact.text);
        }
    }

    #[test]
    fn test_long_facts_sorted_by_word_count() {
        let a = vec!["alpha"; 52].join(" ");
        let b = vec!["beta"; 70].join(" ");
        let summaries = vec![summary("a.md", &[a.as_str(), b.as_str()])];
        let report = FactAnalyzer::default().analyze(&summaries);

        // Each fact's only term is unique to it → rarity < 0.7, so they fall to long
        assert_eq!(report.long.len(), 2);
        assert_eq!(report.long[0].word_count, 70);
        assert_eq!(report.long[1].word_count, 52);
    }

    #[test]
    fn test_common_limit_and_tie_break() {
        let facts: Vec<String> = (0..12).map(|i| format!("shared fact number {:02}", i)).collect();
        let refs: Vec<&str> = facts.iter().map(String::as_str).collect();
        let summaries = vec![summary("a.md", &refs), summary("b.md", &refs), summary("c.md", &refs)];
        let report = FactAnalyzer::default().analyze(&summaries);

        assert_eq!(report.common.len(), 10);
        assert_eq!(report.common[0].text, "shared fact number 00");
        assert_eq!(report.common[9].text, "shared fact number 09");
        // Facts cut by the limit still count as common
        assert!(report.unusual.is_empty());
        assert!(report.long.is_empty());
    }

    #[test]
    fn test_fact_without_terms_has_zero_rarity() {
        let summaries = vec![summary("a.md", &["The of and"])];
        let facts = FactAnalyzer::default().score(&summaries);
        assert_eq!(facts[0].rarity, 0.0);
    }

    #[test]
    fn test_empty_input() {
        let report = FactAnalyzer::default().analyze(&[]);
        assert!(report.is_empty());
        assert_eq!(report.total_facts, 0);
    }

    #[test]
    fn test_thresholds_validation() {
        assert!(FactThresholds::default().validate().is_ok());
        assert!(FactThresholds::aggressive().validate().is_ok());
        assert!(FactThresholds::lenient().validate().is_ok());
        let mut t = FactThresholds::default();
        t.unusual_min_rarity = 1.5;
        assert!(t.validate().is_err());
    }
}
