//! Agglomerative clustering over a precomputed distance matrix
//!
//! The pipeline only depends on the [`Clusterer`] trait: given a symmetric
//! distance matrix and a merge threshold, return one label per row. The
//! built-in [`AgglomerativeClusterer`] implements it from scratch.
//!
//! **Linkage methods** determine "distance between clusters":
//!
//! | Linkage | Distance | Effect |
//! |---------|----------|--------|
//! | Single | min(pairwise) | Chaining; elongated clusters |
//! | Complete | max(pairwise) | Compact clusters, every pair within threshold |
//! | Average | mean(pairwise) | Balanced compromise |
//!
//! The dendrogram is built with the nearest-neighbor chain algorithm
//! (O(n²) time), which yields the same hierarchy as greedy closest-pair
//! merging for all three linkages. Merges at height <= threshold are kept.

use serde::{Deserialize, Serialize};

use crate::matrix::{condensed_index, DistanceMatrix};

/// Cluster-to-cluster distance rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Linkage {
    /// Maximum pairwise distance between members
    #[default]
    Complete,
    /// Minimum pairwise distance between members
    Single,
    /// Mean pairwise distance between members
    Average,
}

impl Linkage {
    /// Lance-Williams update: distance from `a ∪ b` to `k`.
    fn merged_distance(self, d_ak: f64, d_bk: f64, size_a: usize, size_b: usize) -> f64 {
        match self {
            Linkage::Complete => d_ak.max(d_bk),
            Linkage::Single => d_ak.min(d_bk),
            Linkage::Average => {
                (size_a as f64 * d_ak + size_b as f64 * d_bk) / (size_a + size_b) as f64
            }
        }
    }
}

/// Partitions rows of a distance matrix.
pub trait Clusterer {
    /// One label per row. Rows sharing a label belong to one cluster;
    /// `None` marks a row the clusterer left unassigned.
    fn cluster(&self, matrix: &DistanceMatrix, threshold: f64) -> Vec<Option<usize>>;
}

/// One step of the dendrogram: `absorbed` was merged into `kept` at `height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    pub kept: usize,
    pub absorbed: usize,
    pub height: f64,
}

/// Bottom-up hierarchical clustering with a distance threshold and no fixed
/// cluster count.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgglomerativeClusterer {
    pub linkage: Linkage,
}

impl AgglomerativeClusterer {
    pub fn new(linkage: Linkage) -> Self {
        Self { linkage }
    }

    /// Full merge history. A cluster is identified by its smallest row index.
    pub fn dendrogram(&self, matrix: &DistanceMatrix) -> Vec<Merge> {
        let n = matrix.len();
        // Working copy of the upper triangle, updated in place as clusters merge
        let mut dist: Vec<f64> = matrix
            .condensed()
            .iter()
            .map(|&d| if d.is_nan() { f64::INFINITY } else { d })
            .collect();
        let at = |i: usize, j: usize| condensed_index(n, i, j);
        let mut active = vec![true; n];
        let mut sizes = vec![1usize; n];
        let mut merges = Vec::with_capacity(n.saturating_sub(1));
        let mut chain: Vec<usize> = Vec::new();

        for _ in 1..n {
            if chain.is_empty() {
                if let Some(first) = active.iter().position(|&a| a) {
                    chain.push(first);
                }
            }

            // Grow the chain until the last two clusters are reciprocal nearest neighbors
            let (a, b) = loop {
                let Some(&tip) = chain.last() else {
                    return merges;
                };
                let prev = chain.len().checked_sub(2).map(|i| chain[i]);
                let mut best = prev;
                let mut best_d = prev.map_or(f64::INFINITY, |p| dist[at(tip, p)]);
                for k in (0..n).filter(|&k| active[k] && k != tip) {
                    let d = dist[at(tip, k)];
                    if best.is_none() || d < best_d {
                        best = Some(k);
                        best_d = d;
                    }
                }
                match best {
                    Some(nearest) if Some(nearest) == prev => {
                        chain.pop();
                        chain.pop();
                        break (tip, nearest);
                    }
                    Some(nearest) => chain.push(nearest),
                    None => return merges,
                }
            };

            let (kept, absorbed) = (a.min(b), a.max(b));
            let height = dist[at(kept, absorbed)];
            for k in (0..n).filter(|&k| active[k] && k != kept && k != absorbed) {
                let merged = self.linkage.merged_distance(
                    dist[at(kept, k)],
                    dist[at(absorbed, k)],
                    sizes[kept],
                    sizes[absorbed],
                );
                dist[at(kept, k)] = merged;
            }
            active[absorbed] = false;
            sizes[kept] += sizes[absorbed];
            merges.push(Merge {
                kept,
                absorbed,
                height,
            });
        }

        merges
    }
}

impl Clusterer for AgglomerativeClusterer {
    fn cluster(&self, matrix: &DistanceMatrix, threshold: f64) -> Vec<Option<usize>> {
        let n = matrix.len();
        let mut sets = DisjointSet::new(n);
        for merge in self.dendrogram(matrix) {
            // NaN thresholds never merge
            if merge.height <= threshold {
                sets.union(merge.kept, merge.absorbed);
            }
        }

        // Number clusters by their first row
        let mut label_of_root: Vec<Option<usize>> = vec![None; n];
        let mut next_label = 0;
        (0..n)
            .map(|i| {
                let root = sets.find(i);
                let label = *label_of_root[root].get_or_insert_with(|| {
                    next_label += 1;
                    next_label - 1
                });
                Some(label)
            })
            .collect()
    }
}

/// Union-find over row indices.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (keep, drop) = (ra.min(rb), ra.max(rb));
            self.parent[drop] = keep;
        }
    }
}
