//! Prompt construction for conclusion synthesis

use sift_domain::{AnalyzedFact, DocumentSummary, FactReport};
use sift_llm::CompletionRequest;
use std::fmt::Write;

/// JSON schema the provider must answer with
pub const CONCLUSIONS_SCHEMA: &str = r#"{
  "type": "object",
  "required": ["conclusions", "recommendations", "evidence"],
  "properties": {
    "conclusions": {"type": "array", "items": {"type": "string"}},
    "recommendations": {"type": "array", "items": {"type": "string"}},
    "evidence": {"type": "array", "items": {"type": "string"}},
    "confidence": {"type": "number", "minimum": 0, "maximum": 1}
  }
}"#;

const SYSTEM_PROMPT: &str = "You are an analyst reviewing a digest of recently modified documents. \
Draw strategic conclusions that hold across documents, recommend concrete next steps, and cite \
the evidence each conclusion rests on. Keep every item to one or two sentences. Do not invent \
facts that are absent from the material.";

/// Everything the synthesizer reads from a finished run
#[derive(Debug, Clone, Copy)]
pub struct SynthesisInput<'a> {
    /// Per-document summaries, in run order
    pub summaries: &'a [DocumentSummary],

    /// Categorized facts
    pub facts: &'a FactReport,

    /// Most connected entity labels, when the graph was built
    pub top_entities: &'a [String],

    /// Cluster labels, when the graph was built
    pub cluster_labels: &'a [String],
}

impl<'a> SynthesisInput<'a> {
    /// Input from summaries and facts only
    pub fn new(summaries: &'a [DocumentSummary], facts: &'a FactReport) -> Self {
        Self {
            summaries,
            facts,
            top_entities: &[],
            cluster_labels: &[],
        }
    }

    /// Attach graph-derived context
    pub fn with_graph(mut self, top_entities: &'a [String], cluster_labels: &'a [String]) -> Self {
        self.top_entities = top_entities;
        self.cluster_labels = cluster_labels;
        self
    }

    /// Mean citation-derived confidence of the summaries; 0 without summaries
    pub fn mean_confidence(&self) -> f64 {
        if self.summaries.is_empty() {
            return 0.0;
        }
        self.summaries.iter().map(|s| s.confidence).sum::<f64>() / self.summaries.len() as f64
    }
}

/// Build the single synthesis request for a run
pub fn build_request(
    input: &SynthesisInput<'_>,
    max_items: usize,
    max_summaries: usize,
    max_tokens: u32,
) -> CompletionRequest {
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "Review the {} document summaries below and give at most {} conclusions, {} recommendations and {} pieces of evidence.\n",
        input.summaries.len(),
        max_items,
        max_items,
        max_items
    );

    prompt.push_str("## Document summaries\n\n");
    for summary in input.summaries.iter().take(max_summaries) {
        let _ = writeln!(
            prompt,
            "### {} (confidence {:.2})\n{}",
            summary.document, summary.confidence, summary.summary
        );
        for fact in &summary.key_facts {
            let _ = writeln!(prompt, "- {}", fact);
        }
        prompt.push('\n');
    }
    if input.summaries.len() > max_summaries {
        let _ = writeln!(
            prompt,
            "({} further summaries omitted)\n",
            input.summaries.len() - max_summaries
        );
    }

    push_facts(&mut prompt, "Common facts (seen in several documents)", &input.facts.common);
    push_facts(&mut prompt, "Unusual facts (rare vocabulary)", &input.facts.unusual);
    push_facts(&mut prompt, "Long facts", &input.facts.long);

    if !input.top_entities.is_empty() {
        let _ = writeln!(prompt, "## Key entities\n{}\n", input.top_entities.join(", "));
    }
    if !input.cluster_labels.is_empty() {
        let _ = writeln!(prompt, "## Themes\n{}\n", input.cluster_labels.join(", "));
    }

    prompt.push_str(
        "Respond with one JSON object with the keys \"conclusions\", \"recommendations\", \
\"evidence\" (arrays of strings) and \"confidence\" (a number between 0 and 1).",
    );

    CompletionRequest::new(prompt)
        .with_system(SYSTEM_PROMPT)
        .with_schema(CONCLUSIONS_SCHEMA)
        .with_max_tokens(max_tokens)
}

fn push_facts(prompt: &mut String, heading: &str, facts: &[AnalyzedFact]) {
    if facts.is_empty() {
        return;
    }
    let _ = writeln!(prompt, "## {}", heading);
    for fact in facts {
        let _ = writeln!(prompt, "- {} ({} documents)", fact.text, fact.frequency);
    }
    prompt.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(path: &str, text: &str) -> DocumentSummary {
        DocumentSummary::new(path, text, vec![format!("{} fact [source: {}]", path, path)], vec![])
    }

    #[test]
    fn test_prompt_contains_summaries_and_facts() {
        let summaries = vec![summary("a.md", "Alpha summary"), summary("b.md", "Beta summary")];
        let facts = FactReport::default();
        let request = build_request(&SynthesisInput::new(&summaries, &facts), 5, 50, 1000);

        assert!(request.prompt.contains("### a.md (confidence 1.00)"));
        assert!(request.prompt.contains("Beta summary"));
        assert!(request.prompt.contains("- a.md fact [source: a.md]"));
        assert!(!request.prompt.contains("## Key entities"));
        assert_eq!(request.schema.as_deref(), Some(CONCLUSIONS_SCHEMA));
        assert_eq!(request.max_tokens, 1000);
    }

    #[test]
    fn test_prompt_caps_summaries() {
        let summaries: Vec<_> = (0..4)
            .map(|i| summary(&format!("{}.md", i), "text"))
            .collect();
        let facts = FactReport::default();
        let request = build_request(&SynthesisInput::new(&summaries, &facts), 5, 2, 1000);

        assert!(request.prompt.contains("### 1.md"));
        assert!(!request.prompt.contains("### 2.md"));
        assert!(request.prompt.contains("(2 further summaries omitted)"));
    }

    #[test]
    fn test_graph_context_included() {
        let summaries = vec![summary("a.md", "x")];
        let facts = FactReport::default();
        let entities = vec!["Acme Corp".to_string()];
        let themes = vec!["Budget & Hiring".to_string()];
        let input = SynthesisInput::new(&summaries, &facts).with_graph(&entities, &themes);
        let request = build_request(&input, 5, 50, 1000);

        assert!(request.prompt.contains("## Key entities\nAcme Corp"));
        assert!(request.prompt.contains("## Themes\nBudget & Hiring"));
    }

    #[test]
    fn test_mean_confidence() {
        let summaries = vec![
            summary("a.md", "x"),
            DocumentSummary::new("b.md", "y", vec!["uncited".to_string()], vec![]),
        ];
        let facts = FactReport::default();
        assert_eq!(SynthesisInput::new(&summaries, &facts).mean_confidence(), 0.5);
        assert_eq!(SynthesisInput::new(&[], &facts).mean_confidence(), 0.0);
    }
}
