//! Semantic clusters of graph nodes

use serde::{Deserialize, Serialize};

/// A coherence-scored group of graph nodes
///
/// Built fresh per run; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCluster {
    /// Cluster index within the run
    pub id: usize,

    /// Descriptive label derived from member labels
    pub label: String,

    /// Ids of member nodes
    pub members: Vec<String>,

    /// Centroid in the bag-of-words space (empty for the trivial cluster)
    pub centroid: Vec<f64>,

    /// 1 − (mean distance to centroid / 2), floored at 0
    pub coherence: f64,
}

impl EntityCluster {
    /// Single cluster holding every node, coherence 1.0
    pub fn trivial(members: Vec<String>) -> Self {
        Self {
            id: 0,
            label: "All Entities".to_string(),
            members,
            centroid: Vec::new(),
            coherence: 1.0,
        }
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when the cluster has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
