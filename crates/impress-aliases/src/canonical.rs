//! Canonical cluster ids
//!
//! Raw clustering labels are arbitrary. This module reorders rows by
//! cluster size (largest first, ties broken by the cluster's earliest row)
//! and densely renumbers clusters from 0 so that ids are reproducible for a
//! fixed input ordering. Unlabelled rows each become their own cluster and
//! sort after every labelled one.

use std::cmp::Reverse;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{AliasError, Result};

/// Final mapping from `full_id` to canonical cluster id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterMap {
    ids: HashMap<String, usize>,
    /// `full_id`s per canonical id, in presentation order
    groups: Vec<Vec<String>>,
    /// Canonical id per input row
    row_ids: Vec<usize>,
}

impl ClusterMap {
    /// Canonical id for a `full_id`; `None` when the id was never seen.
    pub fn get(&self, full_id: &str) -> Option<usize> {
        self.ids.get(full_id).copied()
    }

    /// Number of distinct clusters.
    pub fn num_clusters(&self) -> usize {
        self.groups.len()
    }

    /// Members of each cluster, indexed by canonical id.
    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }

    /// Canonical id of each input row, in input order.
    pub fn row_ids(&self) -> &[usize] {
        &self.row_ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.ids.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Dense re-indexing key: a real label, or the rank of an unlabelled row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum GroupKey {
    Label(usize),
    Unassigned(usize),
}

/// Turn raw labels into canonical ids.
///
/// `full_ids[i]` and `labels[i]` describe row `i`. When the same `full_id`
/// appears on several rows, the row placed last in presentation order wins.
pub fn canonicalize(full_ids: &[String], labels: &[Option<usize>]) -> Result<ClusterMap> {
    if full_ids.len() != labels.len() {
        return Err(AliasError::MatrixShape {
            expected: full_ids.len(),
            got: labels.len(),
        });
    }
    let n = labels.len();

    let mut sizes: HashMap<usize, usize> = HashMap::new();
    let mut first_row: HashMap<usize, usize> = HashMap::new();
    for (row, label) in labels.iter().enumerate() {
        if let Some(label) = *label {
            *sizes.entry(label).or_insert(0) += 1;
            first_row.entry(label).or_insert(row);
        }
    }

    // Labelled rows first, by (size desc, earliest row of cluster, row)
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&row| match labels[row] {
        Some(label) => (false, Reverse(sizes[&label]), first_row[&label], row),
        None => (true, Reverse(1), row, row),
    });

    // Unlabelled rows get a placeholder keyed by rank, in their own key space
    let mut dense: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<String>> = Vec::new();
    let mut ids: HashMap<String, usize> = HashMap::new();
    let mut row_ids = vec![0usize; n];
    for (rank, &row) in order.iter().enumerate() {
        let key = match labels[row] {
            Some(label) => GroupKey::Label(label),
            None => GroupKey::Unassigned(rank),
        };
        let next = dense.len();
        let id = *dense.entry(key).or_insert(next);
        if id == groups.len() {
            groups.push(Vec::new());
        }
        groups[id].push(full_ids[row].clone());
        ids.insert(full_ids[row].clone(), id);
        row_ids[row] = id;
    }

    Ok(ClusterMap {
        ids,
        groups,
        row_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_larger_clusters_get_lower_ids() {
        let full_ids = keys(&["a", "b", "c", "d", "e"]);
        let labels = vec![Some(7), Some(3), Some(3), Some(3), Some(7)];
        let map = canonicalize(&full_ids, &labels).unwrap();
        assert_eq!(map.get("b"), Some(0));
        assert_eq!(map.get("c"), Some(0));
        assert_eq!(map.get("d"), Some(0));
        assert_eq!(map.get("a"), Some(1));
        assert_eq!(map.get("e"), Some(1));
        assert_eq!(map.num_clusters(), 2);
        assert_eq!(map.row_ids(), &[1, 0, 0, 0, 1]);
    }

    #[test]
    fn test_tie_broken_by_earliest_row() {
        let full_ids = keys(&["a", "b", "c", "d"]);
        // Equal sizes: the cluster that appears first wins, whatever its raw label
        let labels = vec![Some(9), Some(1), Some(9), Some(1)];
        let map = canonicalize(&full_ids, &labels).unwrap();
        assert_eq!(map.get("a"), Some(0));
        assert_eq!(map.get("b"), Some(1));
        assert_eq!(map.groups()[0], keys(&["a", "c"]));
    }

    #[test]
    fn test_unlabelled_rows_become_singletons() {
        let full_ids = keys(&["a", "b", "c", "d"]);
        let labels = vec![None, Some(0), None, Some(0)];
        let map = canonicalize(&full_ids, &labels).unwrap();
        assert_eq!(map.get("b"), Some(0));
        assert_eq!(map.get("d"), Some(0));
        assert_eq!(map.get("a"), Some(1));
        assert_eq!(map.get("c"), Some(2));
        assert_eq!(map.num_clusters(), 3);
    }

    #[test]
    fn test_extreme_labels_never_collide_with_unlabelled() {
        let full_ids = keys(&["a", "b", "c"]);
        let labels = vec![Some(usize::MAX - 1), None, Some(usize::MAX)];
        let map = canonicalize(&full_ids, &labels).unwrap();
        assert_eq!(map.num_clusters(), 3);
        assert_eq!(map.get("a"), Some(0));
        assert_eq!(map.get("c"), Some(1));
        assert_eq!(map.get("b"), Some(2));
    }

    #[test]
    fn test_ids_are_dense() {
        let full_ids = keys(&["a", "b", "c"]);
        let labels = vec![Some(100), Some(42), Some(5)];
        let map = canonicalize(&full_ids, &labels).unwrap();
        let mut ids: Vec<usize> = map.iter().map(|(_, id)| id).collect();
        ids.sort();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_unknown_full_id_is_missing() {
        let map = canonicalize(&keys(&["a"]), &[Some(0)]).unwrap();
        assert_eq!(map.get("zzz"), None);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(canonicalize(&keys(&["a", "b"]), &[Some(0)]).is_err());
    }

    #[test]
    fn test_empty() {
        let map = canonicalize(&[], &[]).unwrap();
        assert!(map.is_empty());
        assert_eq!(map.num_clusters(), 0);
    }
}
