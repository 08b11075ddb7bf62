//! Output formatting for the CLI.

use crate::error::Result;
use colored::*;
use sift_domain::{AnalyzedFact, Conclusions};
use sift_pipeline::{Digest, GraphAnalysis};
use std::fmt::Write;

/// Relationships listed in the markdown report.
const TOP_EDGES: usize = 10;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown report
    Markdown,
    /// Pretty-printed JSON
    Json,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Render a digest in the configured format.
    pub fn render(&self, digest: &Digest) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(digest)?),
            OutputFormat::Markdown => Ok(self.render_markdown(digest)),
        }
    }

    /// One-line run summary for stderr.
    pub fn run_summary(&self, digest: &Digest) -> String {
        let stats = &digest.stats;
        let msg = format!(
            "✓ {} documents in {} batches ({} mode), {} tokens, mean confidence {:.2}, {} ms",
            stats.documents,
            stats.batches,
            digest.mode,
            stats.total_tokens,
            stats.mean_confidence,
            stats.elapsed_ms
        );
        if stats.fallback_batches > 0 {
            let warning = format!(" ({} batches used the fallback provider)", stats.fallback_batches);
            format!("{}{}", self.colorize(&msg, "green"), self.colorize(&warning, "yellow"))
        } else {
            self.colorize(&msg, "green")
        }
    }

    fn render_markdown(&self, digest: &Digest) -> String {
        let mut out = String::from("# Sift Digest\n\n");
        let stats = &digest.stats;

        out.push_str("## Run Statistics\n\n");
        let _ = writeln!(out, "- Documents: {}", stats.documents);
        let _ = writeln!(out, "- Batches: {}", stats.batches);
        let _ = writeln!(out, "- Analysis mode: {}", digest.mode);
        let _ = writeln!(out, "- Tokens: {}", stats.total_tokens);
        let _ = writeln!(out, "- Mean confidence: {:.2}", stats.mean_confidence);
        let _ = writeln!(out, "- Fallback batches: {}", stats.fallback_batches);
        let _ = writeln!(out, "- Elapsed: {} ms\n", stats.elapsed_ms);

        if let Some(conclusions) = digest.conclusions.as_ref().filter(|c| !c.is_empty()) {
            render_conclusions(&mut out, conclusions);
        }

        render_facts(&mut out, "Common Facts", &digest.facts.common, |f| {
            format!("{} documents: {}", f.frequency, join_sources(f))
        });
        render_facts(&mut out, "Unusual Facts", &digest.facts.unusual, |f| {
            format!("rarity {:.2}, {}", f.rarity, join_sources(f))
        });
        render_facts(&mut out, "Long Facts", &digest.facts.long, |f| {
            format!("{} words, {}", f.word_count, join_sources(f))
        });

        out.push_str("## Document Summaries\n\n");
        for summary in &digest.summaries {
            let _ = writeln!(
                out,
                "### {} (confidence {:.2})\n\n{}\n",
                summary.document, summary.confidence, summary.summary
            );
            render_list(&mut out, "Key facts", &summary.key_facts);
            render_list(&mut out, "Insights", &summary.insights);
            if !summary.statistics.is_empty() {
                out.push_str("**Statistics**\n\n");
                for (key, value) in &summary.statistics {
                    let _ = writeln!(out, "- {}: {}", key, value);
                }
                out.push('\n');
            }
        }

        if let Some(analysis) = &digest.graph {
            render_graph(&mut out, analysis);
        }

        out.trim_end().to_string() + "\n"
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn join_sources(fact: &AnalyzedFact) -> String {
    fact.sources.iter().cloned().collect::<Vec<_>>().join(", ")
}

fn render_conclusions(out: &mut String, conclusions: &Conclusions) {
    let _ = writeln!(out, "## Conclusions (confidence {:.2})\n", conclusions.confidence);
    for (i, item) in conclusions.conclusions.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, item);
    }
    out.push('\n');
    render_list(out, "Recommendations", &conclusions.recommendations);
    render_list(out, "Evidence", &conclusions.evidence);
}

fn render_facts(
    out: &mut String,
    heading: &str,
    facts: &[AnalyzedFact],
    detail: impl Fn(&AnalyzedFact) -> String,
) {
    if facts.is_empty() {
        return;
    }
    let _ = writeln!(out, "## {}\n", heading);
    for fact in facts {
        let _ = writeln!(out, "- {} ({})", fact.text, detail(fact));
    }
    out.push('\n');
}

fn render_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "**{}**\n", heading);
    for item in items {
        let _ = writeln!(out, "- {}", item);
    }
    out.push('\n');
}

fn render_graph(out: &mut String, analysis: &GraphAnalysis) {
    let graph = &analysis.graph;
    let label = |id: &str| {
        graph
            .node(id)
            .map(|n| n.label.clone())
            .unwrap_or_else(|| id.to_string())
    };

    out.push_str("## Clusters\n\n");
    for cluster in &analysis.clusters {
        let members: Vec<String> = cluster.members.iter().map(|m| label(m.as_str())).collect();
        let _ = writeln!(
            out,
            "- **{}** (coherence {:.2}): {}",
            cluster.label,
            cluster.coherence,
            members.join(", ")
        );
    }
    out.push('\n');

    let edges = graph.undirected_edges();
    if !edges.is_empty() {
        out.push_str("## Strongest Relationships\n\n");
        for (a, b, weight) in edges.into_iter().take(TOP_EDGES) {
            let _ = writeln!(out, "- {} ↔ {} ({:.2})", label(a), label(b), weight);
        }
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_domain::{
        DocumentSummary, EntityCluster, EntityKind, FactReport, GraphEdge, GraphNode,
        KnowledgeGraph,
    };
    use sift_pipeline::{AnalysisMode, RunStats};
    use std::collections::BTreeSet;

    fn create_test_digest() -> Digest {
        let summary = DocumentSummary::new(
            "notes/a.md",
            "Acme shipped product X.",
            vec!["Acme ships product X [source: notes/a.md:4]".to_string()],
            vec![],
        );
        let fact = AnalyzedFact {
            text: "Acme ships product X".to_string(),
            sources: BTreeSet::from(["notes/a.md".to_string(), "notes/b.md".to_string()]),
            frequency: 2,
            rarity: 0.4,
            word_count: 4,
            category: None,
        };
        Digest {
            summaries: vec![summary],
            facts: FactReport {
                common: vec![fact],
                unusual: vec![],
                long: vec![],
                total_facts: 1,
            },
            mode: AnalysisMode::Standard,
            graph: None,
            conclusions: Some(Conclusions {
                conclusions: vec!["Acme is shipping".to_string()],
                recommendations: vec!["Watch adoption".to_string()],
                evidence: vec![],
                confidence: 0.8,
            }),
            stats: RunStats {
                documents: 1,
                batches: 1,
                summaries: 1,
                total_tokens: 120,
                mean_confidence: 1.0,
                elapsed_ms: 15,
                primary_failures: 0,
                fallback_batches: 0,
            },
        }
    }

    #[test]
    fn test_markdown_sections() {
        let formatter = Formatter::new(OutputFormat::Markdown, false);
        let output = formatter.render(&create_test_digest()).unwrap();

        assert!(output.starts_with("# Sift Digest"));
        assert!(output.contains("- Documents: 1"));
        assert!(output.contains("## Conclusions (confidence 0.80)"));
        assert!(output.contains("1. Acme is shipping"));
        assert!(output.contains("- Acme ships product X (2 documents: notes/a.md, notes/b.md)"));
        assert!(output.contains("### notes/a.md (confidence 1.00)"));
        assert!(!output.contains("## Unusual Facts"));
        assert!(!output.contains("## Clusters"));
    }

    #[test]
    fn test_markdown_graph_sections() {
        let mut digest = create_test_digest();
        digest.mode = AnalysisMode::Graph;
        digest.graph = Some(GraphAnalysis {
            graph: KnowledgeGraph {
                nodes: vec![
                    GraphNode::entity(EntityKind::Organization, "Acme Corp"),
                    GraphNode::entity(EntityKind::Organization, "Globex Inc"),
                ],
                edges: vec![
                    GraphEdge::co_occurs("acme corp", "globex inc", 0.5),
                    GraphEdge::co_occurs("globex inc", "acme corp", 0.5),
                ],
                document_count: 2,
            },
            clusters: vec![EntityCluster::trivial(vec![
                "acme corp".to_string(),
                "globex inc".to_string(),
            ])],
        });

        let output = Formatter::new(OutputFormat::Markdown, false)
            .render(&digest)
            .unwrap();
        assert!(output.contains("- **All Entities** (coherence 1.00): Acme Corp, Globex Inc"));
        assert!(output.contains("- Acme Corp ↔ Globex Inc (0.50)"));
        assert_eq!(output.matches(" ↔ ").count(), 1);
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.render(&create_test_digest()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["mode"], "standard");
        assert_eq!(value["stats"]["documents"], 1);
        assert_eq!(value["summaries"][0]["document"], "notes/a.md");
    }

    #[test]
    fn test_run_summary_without_color() {
        let formatter = Formatter::new(OutputFormat::Markdown, false);
        let mut digest = create_test_digest();
        assert_eq!(
            formatter.run_summary(&digest),
            "✓ 1 documents in 1 batches (standard mode), 120 tokens, mean confidence 1.00, 15 ms"
        );

        digest.stats.fallback_batches = 1;
        assert!(formatter
            .run_summary(&digest)
            .ends_with("(1 batches used the fallback provider)"));
    }
}
