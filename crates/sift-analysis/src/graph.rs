//! Knowledge graph construction
//!
//! The graph is only worth building for large collections; [`GraphTrigger`]
//! decides that from the document count and estimated token volume.

use crate::entities::{EntityTagger, TaggedEntities};
use serde::{Deserialize, Serialize};
use sift_domain::{
    EntityKind, ExtractedDocument, GraphEdge, GraphNode, KnowledgeGraph, NodeType, CHARS_PER_TOKEN,
};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Scale thresholds above which the graph branch runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphTrigger {
    /// Build when there are more documents than this
    pub max_documents: usize,

    /// Build when total estimated tokens exceed this
    pub max_tokens: usize,
}

impl Default for GraphTrigger {
    fn default() -> Self {
        Self {
            max_documents: 50,
            max_tokens: 20_000,
        }
    }
}

impl GraphTrigger {
    /// Aggressive preset: build the graph for smaller collections
    pub fn aggressive() -> Self {
        Self {
            max_documents: 10,
            max_tokens: 5_000,
        }
    }

    /// Lenient preset: build the graph only for very large collections
    pub fn lenient() -> Self {
        Self {
            max_documents: 200,
            max_tokens: 100_000,
        }
    }

    /// Validate the thresholds
    pub fn validate(&self) -> Result<(), String> {
        if self.max_documents == 0 && self.max_tokens == 0 {
            return Err("graph trigger thresholds must not both be 0".to_string());
        }
        Ok(())
    }

    /// True when the collection is large enough for graph analysis
    ///
    /// Tokens are estimated over the combined content, so per-document
    /// remainders still count.
    pub fn should_build(&self, documents: &[ExtractedDocument]) -> bool {
        let chars: usize = documents.iter().map(|d| d.content.chars().count()).sum();
        let tokens = chars / CHARS_PER_TOKEN;
        let build = documents.len() > self.max_documents || tokens > self.max_tokens;
        debug!(documents = documents.len(), tokens, build, "Evaluated graph trigger");
        build
    }
}

/// Builds an entity co-occurrence graph from documents
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraphBuilder {
    tagger: EntityTagger,
}

#[derive(Default)]
struct GraphAccumulator {
    nodes: Vec<GraphNode>,
    index: HashMap<String, usize>,
    // Ordered (source, target) pairs; BTreeMap keeps edge output stable
    co_occurrences: BTreeMap<(String, String), usize>,
}

impl GraphAccumulator {
    fn add_node(&mut self, node: GraphNode) -> String {
        let id = node.id.clone();
        match self.index.get(&id) {
            Some(&idx) => self.nodes[idx].merge(&node),
            None => {
                self.index.insert(id.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
        id
    }

    fn count_pairs(&mut self, ids: &[String]) {
        for a in ids {
            for b in ids {
                if a != b {
                    *self
                        .co_occurrences
                        .entry((a.clone(), b.clone()))
                        .or_insert(0) += 1;
                }
            }
        }
    }
}

impl KnowledgeGraphBuilder {
    /// Create a builder with the given tagger
    pub fn new(tagger: EntityTagger) -> Self {
        Self { tagger }
    }

    /// Tag every document and assemble the graph
    pub fn build(&self, documents: &[ExtractedDocument]) -> KnowledgeGraph {
        let mut acc = GraphAccumulator::default();

        for document in documents {
            let tagged = self.tagger.tag(&document.content);
            self.add_document(&mut acc, &document.path, &tagged);
        }

        let total = documents.len().max(1) as f64;
        let edges: Vec<GraphEdge> = acc
            .co_occurrences
            .into_iter()
            .map(|((source, target), count)| {
                GraphEdge::co_occurs(source, target, (count as f64 / total).min(1.0))
            })
            .collect();

        info!(
            documents = documents.len(),
            nodes = acc.nodes.len(),
            edges = edges.len(),
            "Knowledge graph built"
        );

        KnowledgeGraph {
            nodes: acc.nodes,
            edges,
            document_count: documents.len(),
        }
    }

    fn add_document(&self, acc: &mut GraphAccumulator, path: &str, tagged: &TaggedEntities) {
        let groups = [
            (EntityKind::Person, &tagged.people),
            (EntityKind::Place, &tagged.places),
            (EntityKind::Organization, &tagged.organizations),
        ];

        for (kind, labels) in groups {
            let mut ids: Vec<String> = Vec::with_capacity(labels.len());
            for label in labels {
                let id = acc.add_node(GraphNode::entity(kind, label.as_str()).with_source(path));
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            acc.count_pairs(&ids);
        }

        for concept in &tagged.concepts {
            acc.add_node(GraphNode::new(NodeType::Concept, concept.as_str()).with_source(path));
        }

        debug!(
            path,
            people = tagged.people.len(),
            places = tagged.places.len(),
            organizations = tagged.organizations.len(),
            concepts = tagged.concepts.len(),
            "Tagged document"
        );
    }
}
