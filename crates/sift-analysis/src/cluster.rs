//! K-means clustering of graph nodes over label bag-of-words vectors

use crate::error::{AnalysisError, Result};
use crate::text::{title_case, tokenize};
use serde::{Deserialize, Serialize};
use sift_domain::{EntityCluster, GraphNode};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

/// Below this many nodes clustering is skipped
pub const MIN_NODES_TO_CLUSTER: usize = 3;

/// Clustering parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Lower bound on k
    pub min_clusters: usize,

    /// Upper bound on k
    pub max_clusters: usize,

    /// Maximum k-means rounds
    pub max_iterations: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            min_clusters: 2,
            max_clusters: 10,
            max_iterations: 100,
        }
    }
}

impl ClusterConfig {
    /// Aggressive preset: allow finer partitions and longer convergence
    pub fn aggressive() -> Self {
        Self {
            min_clusters: 2,
            max_clusters: 20,
            max_iterations: 200,
        }
    }

    /// Lenient preset: few broad clusters
    pub fn lenient() -> Self {
        Self {
            min_clusters: 2,
            max_clusters: 5,
            max_iterations: 50,
        }
    }

    /// Validate the parameters
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.min_clusters == 0 {
            return Err("min_clusters must be at least 1".to_string());
        }
        if self.min_clusters > self.max_clusters {
            return Err(format!(
                "min_clusters ({}) must not exceed max_clusters ({})",
                self.min_clusters, self.max_clusters
            ));
        }
        if self.max_iterations == 0 {
            return Err("max_iterations must be at least 1".to_string());
        }
        Ok(())
    }

    /// k for `n` points: clamp(floor(sqrt(n / 2)), min, max), never above n
    ///
    /// An inverted range resolves to `max_clusters`.
    pub fn cluster_count(&self, n: usize) -> usize {
        let raw = (n as f64 / 2.0).sqrt().floor() as usize;
        raw.max(self.min_clusters).min(self.max_clusters).min(n)
    }
}

/// Groups graph nodes by the words in their labels
#[derive(Debug, Clone, Default)]
pub struct SemanticClusterer {
    config: ClusterConfig,
}

impl SemanticClusterer {
    /// Create a clusterer
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    /// Current configuration
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Cluster `nodes`; never fails, degrading to a single trivial cluster
    pub fn cluster(&self, nodes: &[GraphNode]) -> Vec<EntityCluster> {
        let ids: Vec<String> = nodes.iter().map(|n| n.id.clone()).collect();
        if nodes.len() < MIN_NODES_TO_CLUSTER {
            debug!(nodes = nodes.len(), "Too few nodes to cluster");
            return vec![EntityCluster::trivial(ids)];
        }

        match self.try_cluster(nodes) {
            Ok(clusters) => {
                info!(nodes = nodes.len(), clusters = clusters.len(), "Clustered graph nodes");
                clusters
            }
            Err(e) => {
                warn!(error = %e, "Clustering failed, using a single cluster");
                vec![EntityCluster::trivial(ids)]
            }
        }
    }

    /// Run k-means, surfacing numeric problems as errors
    pub fn try_cluster(&self, nodes: &[GraphNode]) -> Result<Vec<EntityCluster>> {
        self.config.validate().map_err(AnalysisError::Config)?;

        let tokens: Vec<Vec<String>> = nodes.iter().map(|n| tokenize(&n.label)).collect();
        let vocabulary: Vec<&str> = tokens
            .iter()
            .flatten()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if vocabulary.is_empty() {
            return Err(AnalysisError::EmptyVocabulary);
        }

        let points: Vec<Vec<f64>> = tokens.iter().map(|t| vectorize(t, &vocabulary)).collect();
        let k = self.config.cluster_count(points.len());
        let mut centroids = initial_centroids(&points, k);
        let mut assignment = assign(&points, &centroids);

        let mut rounds = 1;
        while rounds < self.config.max_iterations {
            centroids = recompute(&points, &assignment, &centroids);
            let next = assign(&points, &centroids);
            rounds += 1;
            if next == assignment {
                break;
            }
            assignment = next;
        }
        debug!(k, rounds, vocabulary = vocabulary.len(), "k-means finished");

        let mut clusters = Vec::with_capacity(k);
        for c in 0..centroids.len() {
            let members: Vec<usize> = (0..points.len()).filter(|&i| assignment[i] == c).collect();
            if members.is_empty() {
                continue;
            }

            let centroid = mean(members.iter().map(|&i| points[i].as_slice()), vocabulary.len());
            let mean_distance = members
                .iter()
                .map(|&i| distance(&points[i], &centroid))
                .sum::<f64>()
                / members.len() as f64;
            if !mean_distance.is_finite() || centroid.iter().any(|v| !v.is_finite()) {
                return Err(AnalysisError::Numeric(format!(
                    "non-finite centroid or distance in cluster {}",
                    c
                )));
            }

            let id = clusters.len();
            clusters.push(EntityCluster {
                id,
                label: cluster_label(members.iter().map(|&i| tokens[i].as_slice()), id),
                members: members.iter().map(|&i| nodes[i].id.clone()).collect(),
                centroid,
                coherence: (1.0 - mean_distance / 2.0).max(0.0),
            });
        }

        Ok(clusters)
    }
}

fn vectorize(tokens: &[String], vocabulary: &[&str]) -> Vec<f64> {
    vocabulary
        .iter()
        .map(|word| {
            if tokens.iter().any(|t| t == word) {
                1.0
            } else {
                0.0
            }
        })
        .collect()
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

fn mean<'a>(points: impl Iterator<Item = &'a [f64]>, dims: usize) -> Vec<f64> {
    let mut sum = vec![0.0; dims];
    let mut count = 0usize;
    for point in points {
        for (s, v) in sum.iter_mut().zip(point) {
            *s += v;
        }
        count += 1;
    }
    if count > 0 {
        for s in &mut sum {
            *s /= count as f64;
        }
    }
    sum
}

/// Index of the first point with the strictly smallest/largest key
fn arg_best(keys: impl Iterator<Item = f64>, larger: bool) -> usize {
    let mut best = 0;
    let mut best_key = if larger { f64::NEG_INFINITY } else { f64::INFINITY };
    for (i, key) in keys.enumerate() {
        if (larger && key > best_key) || (!larger && key < best_key) {
            best = i;
            best_key = key;
        }
    }
    best
}

/// Farthest-point seeding, starting from the point nearest the overall mean
fn initial_centroids(points: &[Vec<f64>], k: usize) -> Vec<Vec<f64>> {
    let dims = points.first().map_or(0, Vec::len);
    let center = mean(points.iter().map(Vec::as_slice), dims);

    let first = arg_best(points.iter().map(|p| distance(p, &center)), false);
    let mut chosen = vec![first];
    while chosen.len() < k {
        let next = arg_best(
            points.iter().enumerate().map(|(i, p)| {
                if chosen.contains(&i) {
                    f64::NEG_INFINITY
                } else {
                    chosen
                        .iter()
                        .map(|&c| distance(p, &points[c]))
                        .fold(f64::INFINITY, f64::min)
                }
            }),
            true,
        );
        chosen.push(next);
    }

    chosen.into_iter().map(|i| points[i].clone()).collect()
}

fn assign(points: &[Vec<f64>], centroids: &[Vec<f64>]) -> Vec<usize> {
    points
        .iter()
        .map(|p| arg_best(centroids.iter().map(|c| distance(p, c)), false))
        .collect()
}

/// New centroids; a centroid that lost all members stays where it was
fn recompute(points: &[Vec<f64>], assignment: &[usize], previous: &[Vec<f64>]) -> Vec<Vec<f64>> {
    previous
        .iter()
        .enumerate()
        .map(|(c, old)| {
            let members: Vec<&[f64]> = points
                .iter()
                .zip(assignment)
                .filter(|(_, &a)| a == c)
                .map(|(p, _)| p.as_slice())
                .collect();
            if members.is_empty() {
                old.clone()
            } else {
                mean(members.into_iter(), old.len())
            }
        })
        .collect()
}

/// Two most frequent words longer than 3 characters, title-cased
fn cluster_label<'a>(member_tokens: impl Iterator<Item = &'a [String]>, id: usize) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for tokens in member_tokens {
        for token in tokens {
            if token.chars().count() > 3 {
                *counts.entry(token.as_str()).or_insert(0) += 1;
            }
        }
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let words: Vec<String> = ranked.iter().take(2).map(|(w, _)| title_case(w)).collect();
    if words.is_empty() {
        format!("Cluster {}", id + 1)
    } else {
        words.join(" & ")
    }
}
