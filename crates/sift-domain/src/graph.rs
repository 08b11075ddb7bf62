//! Entity co-occurrence graph
//!
//! Edges are stored as directed records, but the builder inserts both
//! directions for every observed pair. All lookups here read edges in
//! either direction, so callers never depend on edge orientation.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Relation type used for co-occurrence edges
pub const CO_OCCURS: &str = "co-occurs";

/// Kind of graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Named person, place or organization
    Entity,
    /// Salient common noun
    Concept,
}

/// Sub-kind of an entity node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Named person
    Person,
    /// Named place
    Place,
    /// Named organization
    Organization,
}

/// A node in the knowledge graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Merge key: case-folded, trimmed label
    pub id: String,

    /// Node type
    pub node_type: NodeType,

    /// Entity sub-kind for `NodeType::Entity`
    pub entity_kind: Option<EntityKind>,

    /// Display label (first spelling seen)
    pub label: String,

    /// Documents the node was extracted from
    pub sources: BTreeSet<String>,

    /// Free-form properties
    pub properties: BTreeMap<String, String>,
}

impl GraphNode {
    /// Create a node from a label; the id is the normalized label
    pub fn new(node_type: NodeType, label: impl Into<String>) -> Self {
        let label = label.into().trim().to_string();
        Self {
            id: normalize_label(&label),
            node_type,
            entity_kind: None,
            label,
            sources: BTreeSet::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Create an entity node of the given kind
    pub fn entity(kind: EntityKind, label: impl Into<String>) -> Self {
        let mut node = Self::new(NodeType::Entity, label);
        node.entity_kind = Some(kind);
        node
    }

    /// Add a contributing source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.sources.insert(source.into());
        self
    }

    /// Merge another mention of the same node, unioning sources
    pub fn merge(&mut self, other: &GraphNode) {
        self.sources.extend(other.sources.iter().cloned());
        for (k, v) in &other.properties {
            self.properties.entry(k.clone()).or_insert_with(|| v.clone());
        }
    }
}

/// Case-fold and trim a label into a node merge key
///
/// # Examples
///
/// ```
/// use sift_domain::normalize_label;
///
/// assert_eq!(normalize_label("Acme Corp"), normalize_label("acme corp "));
/// ```
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A weighted co-occurrence edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Source node id
    pub source: String,

    /// Target node id
    pub target: String,

    /// Relation type (always "co-occurs" for built graphs)
    pub relation: String,

    /// min(co-occurrence count / total documents, 1.0)
    pub weight: f64,
}

impl GraphEdge {
    /// Create a co-occurrence edge
    pub fn co_occurs(source: impl Into<String>, target: impl Into<String>, weight: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relation: CO_OCCURS.to_string(),
            weight: weight.clamp(0.0, 1.0),
        }
    }

    /// True when the edge links `a` and `b` in either direction
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// Knowledge graph built for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    /// Nodes, ordered by first appearance
    pub nodes: Vec<GraphNode>,

    /// Edges (both directions present for every observed pair)
    pub edges: Vec<GraphEdge>,

    /// Number of documents the graph was built from
    pub document_count: usize,
}

impl KnowledgeGraph {
    /// Look up a node by id
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Ids of nodes connected to `id`, regardless of edge direction
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        for edge in &self.edges {
            if edge.source == id {
                seen.insert(edge.target.as_str());
            } else if edge.target == id {
                seen.insert(edge.source.as_str());
            }
        }
        seen.into_iter().collect()
    }

    /// Weight of the edge between `a` and `b`, in either direction
    pub fn edge_weight(&self, a: &str, b: &str) -> Option<f64> {
        self.edges
            .iter()
            .filter(|e| e.connects(a, b))
            .map(|e| e.weight)
            .reduce(f64::max)
    }

    /// Unordered pairs with their weight, strongest first
    pub fn undirected_edges(&self) -> Vec<(&str, &str, f64)> {
        let mut pairs: HashMap<(&str, &str), f64> = HashMap::new();
        for edge in &self.edges {
            let key = if edge.source <= edge.target {
                (edge.source.as_str(), edge.target.as_str())
            } else {
                (edge.target.as_str(), edge.source.as_str())
            };
            let entry = pairs.entry(key).or_insert(0.0);
            *entry = entry.max(edge.weight);
        }
        let mut result: Vec<_> = pairs.into_iter().map(|((a, b), w)| (a, b, w)).collect();
        result.sort_by(|x, y| {
            y.2.partial_cmp(&x.2)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| (x.0, x.1).cmp(&(y.0, y.1)))
        });
        result
    }

    /// Entity nodes ranked by number of contributing documents
    pub fn top_entities(&self, limit: usize) -> Vec<&GraphNode> {
        let mut entities: Vec<_> = self
            .nodes
            .iter()
            .filter(|n| n.node_type == NodeType::Entity)
            .collect();
        entities.sort_by(|a, b| {
            b.sources
                .len()
                .cmp(&a.sources.len())
                .then_with(|| a.id.cmp(&b.id))
        });
        entities.truncate(limit);
        entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  Acme   Corp "), "acme corp");
        assert_eq!(normalize_label("acme corp "), "acme corp");
    }

    #[test]
    fn test_node_merge_unions_sources() {
        let mut a = GraphNode::entity(EntityKind::Organization, "Acme Corp").with_source("a.md");
        let b = GraphNode::entity(EntityKind::Organization, "acme corp ").with_source("b.md");
        assert_eq!(a.id, b.id);
        a.merge(&b);
        assert_eq!(a.sources.len(), 2);
        assert_eq!(a.label, "Acme Corp");
    }

    #[test]
    fn test_lookups_are_symmetric() {
        let graph = KnowledgeGraph {
            nodes: vec![
                GraphNode::new(NodeType::Entity, "Alice"),
                GraphNode::new(NodeType::Entity, "Bob"),
                GraphNode::new(NodeType::Entity, "Carol"),
            ],
            edges: vec![
                GraphEdge::co_occurs("alice", "bob", 0.5),
                GraphEdge::co_occurs("carol", "alice", 0.25),
            ],
            document_count: 4,
        };

        assert_eq!(graph.neighbors("alice"), vec!["bob", "carol"]);
        assert_eq!(graph.neighbors("bob"), vec!["alice"]);
        assert_eq!(graph.edge_weight("bob", "alice"), Some(0.5));
        assert_eq!(graph.edge_weight("alice", "carol"), Some(0.25));
        assert_eq!(graph.edge_weight("bob", "carol"), None);
    }

    #[test]
    fn test_undirected_edges_dedupes_directions() {
        let graph = KnowledgeGraph {
            nodes: vec![],
            edges: vec![
                GraphEdge::co_occurs("a", "b", 0.5),
                GraphEdge::co_occurs("b", "a", 0.5),
                GraphEdge::co_occurs("c", "a", 1.0),
            ],
            document_count: 2,
        };
        let pairs = graph.undirected_edges();
        assert_eq!(pairs, vec![("a", "c", 1.0), ("a", "b", 0.5)]);
    }

    #[test]
    fn test_edge_weight_clamped() {
        assert_eq!(GraphEdge::co_occurs("a", "b", 3.0).weight, 1.0);
    }
}
