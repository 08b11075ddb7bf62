//! Sift Analysis
//!
//! Synchronous, CPU-bound analysis over the results of a run:
//!
//! - [`FactAnalyzer`]: groups key facts across summaries and ranks them as
//!   common, unusual (TF-IDF rarity) or long
//! - [`KnowledgeGraphBuilder`]: tags people, places, organizations and
//!   concepts per document and links same-kind entities that co-occur
//! - [`SemanticClusterer`]: k-means over bag-of-words vectors of node labels
//!
//! Nothing here performs I/O. Numeric failures degrade to simpler results
//! instead of aborting the run.

#![warn(missing_docs)]

pub mod cluster;
pub mod entities;
pub mod error;
pub mod facts;
pub mod graph;
pub mod text;
pub mod tfidf;

pub use cluster::{ClusterConfig, SemanticClusterer};
pub use entities::{EntityTagger, TaggedEntities};
pub use error::{AnalysisError, Result};
pub use facts::{fact_key, FactAnalyzer, FactThresholds};
pub use graph::{GraphTrigger, KnowledgeGraphBuilder};
pub use tfidf::TfIdfIndex;
