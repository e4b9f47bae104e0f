//! End-to-end alias resolution
//!
//! Synthesizes join keys, groups identical rows, scores all pairs of
//! distinct rows, clusters, canonicalizes, and joins the cluster ids back
//! onto the input row by row.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::canonical::{canonicalize, ClusterMap};
use crate::clustering::{AgglomerativeClusterer, Clusterer};
use crate::config::AliasConfig;
use crate::error::{AliasError, Result};
use crate::matrix::build_distance_matrix;
use crate::normalization::NameNormalizer;
use crate::record::{NormalizedRecord, UserRecord};
use crate::similarity::{PairScore, PairwiseScorer};

/// An input record with its join key and canonical cluster id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    pub record: UserRecord,
    pub full_id: String,
    /// Canonical cluster id of this row; always set by [`AliasResolver::resolve`]
    pub cluster: Option<usize>,
}

/// Output of one resolution run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    records: Vec<ResolvedRecord>,
    cluster_map: ClusterMap,
}

impl Resolution {
    /// Resolved records in input order.
    pub fn records(&self) -> &[ResolvedRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ResolvedRecord> {
        self.records
    }

    pub fn cluster_map(&self) -> &ClusterMap {
        &self.cluster_map
    }

    /// Cluster id for a join key; `None` for unknown keys.
    pub fn cluster_of(&self, full_id: &str) -> Option<usize> {
        self.cluster_map.get(full_id)
    }

    pub fn num_clusters(&self) -> usize {
        self.cluster_map.num_clusters()
    }
}

/// Groups records that belong to the same person.
///
/// Configuration is fixed at construction; `resolve` has no side effects
/// and returns the same result for the same input.
#[derive(Debug, Clone)]
pub struct AliasResolver<C = AgglomerativeClusterer> {
    config: AliasConfig,
    normalizer: NameNormalizer,
    scorer: PairwiseScorer,
    clusterer: C,
}

impl AliasResolver {
    /// Resolver using the built-in agglomerative clusterer.
    pub fn new(config: AliasConfig) -> Self {
        let clusterer = AgglomerativeClusterer::new(config.linkage);
        Self::with_clusterer(config, clusterer)
    }
}

impl Default for AliasResolver {
    fn default() -> Self {
        Self::new(AliasConfig::default())
    }
}

impl<C: Clusterer> AliasResolver<C> {
    /// Resolver with a custom clustering backend.
    pub fn with_clusterer(config: AliasConfig, clusterer: C) -> Self {
        Self {
            normalizer: NameNormalizer::new(&config.banned_words),
            scorer: PairwiseScorer::new(config.weights),
            config,
            clusterer,
        }
    }

    pub fn config(&self) -> &AliasConfig {
        &self.config
    }

    pub fn normalize(&self, record: &UserRecord) -> NormalizedRecord {
        self.normalizer.normalize_record(record)
    }

    /// Score a single pair with a full signal breakdown.
    pub fn explain(&self, a: &UserRecord, b: &UserRecord) -> PairScore {
        self.scorer.explain(&self.normalize(a), &self.normalize(b))
    }

    /// Resolve a batch of records.
    ///
    /// Rows with identical name, email, and login are scored and clustered
    /// once through a single representative, so they always share a
    /// cluster whatever their `full_id`.
    pub fn resolve(&self, records: &[UserRecord]) -> Result<Resolution> {
        self.config.validate()?;

        let (representatives, group_of) = group_identical(records);
        let max = self.config.max_records;
        if max > 0 && representatives.len() > max {
            return Err(AliasError::TooManyRecords {
                count: representatives.len(),
                max,
            });
        }
        tracing::info!(
            records = records.len(),
            distinct = representatives.len(),
            "resolving aliases"
        );

        let normalized: Vec<NormalizedRecord> = representatives
            .iter()
            .map(|&i| self.normalize(&records[i]))
            .collect();
        let matrix = build_distance_matrix(&normalized, &self.scorer);
        tracing::debug!(size = matrix.len(), "built distance matrix");

        let labels = self
            .clusterer
            .cluster(&matrix, self.config.distance_threshold);
        if labels.len() != representatives.len() {
            return Err(AliasError::MatrixShape {
                expected: representatives.len(),
                got: labels.len(),
            });
        }

        let full_ids: Vec<String> = records.iter().map(UserRecord::full_id).collect();
        let row_labels = spread_labels(labels, &group_of);
        let cluster_map = canonicalize(&full_ids, &row_labels)?;
        tracing::info!(
            clusters = cluster_map.num_clusters(),
            threshold = self.config.distance_threshold,
            "alias clusters assigned"
        );

        let resolved = records
            .iter()
            .zip(full_ids)
            .enumerate()
            .map(|(row, (record, full_id))| ResolvedRecord {
                record: record.clone(),
                cluster: cluster_map.row_ids().get(row).copied(),
                full_id,
            })
            .collect();

        Ok(Resolution {
            records: resolved,
            cluster_map,
        })
    }
}

/// Group rows with identical name, email, and login (empty counts as
/// absent). Returns the first row of each group and each row's group.
fn group_identical(records: &[UserRecord]) -> (Vec<usize>, Vec<usize>) {
    fn field(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|v| !v.is_empty())
    }

    let mut seen: HashMap<(Option<&str>, Option<&str>, Option<&str>), usize> = HashMap::new();
    let mut representatives = Vec::new();
    let mut group_of = Vec::with_capacity(records.len());
    for (row, record) in records.iter().enumerate() {
        let key = (field(&record.name), field(&record.email), field(&record.login));
        let group = *seen.entry(key).or_insert_with(|| {
            representatives.push(row);
            representatives.len() - 1
        });
        group_of.push(group);
    }
    let duplicates = records.len() - representatives.len();
    if duplicates > 0 {
        tracing::debug!(duplicates, "grouped identical rows");
    }
    (representatives, group_of)
}

/// Give every row its group's label. A group the clusterer left unassigned
/// keeps `None` when it is a single row, and otherwise gets a fresh label so
/// its copies stay together.
fn spread_labels(mut labels: Vec<Option<usize>>, group_of: &[usize]) -> Vec<Option<usize>> {
    let mut group_sizes = vec![0usize; labels.len()];
    for &group in group_of {
        group_sizes[group] += 1;
    }
    let mut next_free = labels
        .iter()
        .flatten()
        .max()
        .map_or(0, |&label| label.saturating_add(1));
    for (label, &size) in labels.iter_mut().zip(&group_sizes) {
        if label.is_none() && size > 1 {
            *label = Some(next_free);
            next_free = next_free.saturating_add(1);
        }
    }
    group_of.iter().map(|&group| labels[group]).collect()
}

/// Resolve aliases with the built-in clusterer.
pub fn resolve_aliases(records: &[UserRecord], config: &AliasConfig) -> Result<Resolution> {
    AliasResolver::new(config.clone()).resolve(records)
}
