//! Sift Domain Layer
//!
//! This crate holds the data model shared by every stage of the digest
//! pipeline. It carries no I/O and no async code: documents, batches,
//! summaries, analyzed facts, the knowledge graph and clusters are plain
//! in-memory values created once per run and dropped after the digest is
//! assembled.
//!
//! ## Key Concepts
//!
//! - **ExtractedDocument**: One recently modified text file, read upstream
//! - **WorkBatch**: A bounded, ordered group of documents sent in one request
//! - **DocumentSummary**: Provider output for one document, with a
//!   citation-derived confidence
//! - **Citation**: The `[source: path[:line]]` provenance marker
//! - **AnalyzedFact**: A fact grouped across documents with frequency and rarity
//! - **KnowledgeGraph**: Entity co-occurrence graph for large collections
//! - **EntityCluster**: A coherence-scored group of graph nodes
//! - **Conclusions**: Strategic conclusions synthesized across the run

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cluster;
pub mod conclusions;
pub mod document;
pub mod fact;
pub mod graph;
pub mod provenance;
pub mod summary;

// Re-exports for convenience
pub use cluster::EntityCluster;
pub use conclusions::Conclusions;
pub use document::{BatchId, ExtractedDocument, WorkBatch, CHARS_PER_TOKEN};
pub use fact::{AnalyzedFact, FactCategory, FactReport};
pub use graph::{normalize_label, EntityKind, GraphEdge, GraphNode, KnowledgeGraph, NodeType};
pub use provenance::Citation;
pub use summary::{compute_confidence, DocumentSummary};
