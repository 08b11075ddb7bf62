//! TF-IDF index over a small corpus

use std::collections::{BTreeMap, HashMap};

/// Document frequencies for a corpus of tokenized documents
#[derive(Debug, Clone, Default)]
pub struct TfIdfIndex {
    doc_freq: HashMap<String, usize>,
    doc_count: usize,
}

impl TfIdfIndex {
    /// Build an index; each entry of `corpus` is one document's tokens
    pub fn build(corpus: &[Vec<String>]) -> Self {
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for tokens in corpus {
            let mut seen: Vec<&str> = tokens.iter().map(String::as_str).collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *doc_freq.entry(term.to_string()).or_insert(0) += 1;
            }
        }
        Self {
            doc_freq,
            doc_count: corpus.len(),
        }
    }

    /// Number of documents indexed
    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    /// ln(N / df); 0 for unknown terms
    pub fn idf(&self, term: &str) -> f64 {
        match self.doc_freq.get(term) {
            Some(&df) if df > 0 => (self.doc_count as f64 / df as f64).ln(),
            _ => 0.0,
        }
    }

    /// Per-term scores `count(t) × idf(t)` for one document
    pub fn scores(&self, tokens: &[String]) -> BTreeMap<String, f64> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for token in tokens {
            *counts.entry(token.clone()).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .map(|(term, count)| {
                let score = count as f64 * self.idf(&term);
                (term, score)
            })
            .collect()
    }

    /// Mean term score for one document; `None` without terms
    pub fn average_score(&self, tokens: &[String]) -> Option<f64> {
        let scores = self.scores(tokens);
        if scores.is_empty() {
            return None;
        }
        Some(scores.values().sum::<f64>() / scores.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_idf() {
        let index = TfIdfIndex::build(&[doc(&["acme", "ships"]), doc(&["acme", "hires"])]);
        assert_eq!(index.doc_count(), 2);
        assert_eq!(index.idf("acme"), 0.0);
        assert!((index.idf("ships") - 2f64.ln()).abs() < 1e-12);
        assert_eq!(index.idf("unknown"), 0.0);
    }

    #[test]
    fn test_term_counts_multiply() {
        let index = TfIdfIndex::build(&[doc(&["x", "x"]), doc(&["y"])]);
        let scores = index.scores(&doc(&["x", "x"]));
        assert!((scores["x"] - 2.0 * 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_average_score() {
        let index = TfIdfIndex::build(&[doc(&["a", "b"]), doc(&["a", "c"])]);
        let avg = index.average_score(&doc(&["a", "b"])).unwrap();
        assert!((avg - 2f64.ln() / 2.0).abs() < 1e-12);
        assert_eq!(index.average_score(&[]), None);
    }
}
