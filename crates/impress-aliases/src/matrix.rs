//! Symmetric pairwise distance matrix
//!
//! Every pair is evaluated exactly once (upper triangle). Only that
//! triangle is stored, `n(n-1)/2` values, and reads of `(j, i)` mirror
//! `(i, j)`. Time and memory are still O(n²), which bounds practical
//! input size.

use serde::{Deserialize, Serialize};

use crate::error::{AliasError, Result};
use crate::record::NormalizedRecord;
use crate::similarity::PairwiseScorer;

/// Position of the unordered pair `{i, j}` (`i != j`) in condensed storage.
pub(crate) fn condensed_index(size: usize, i: usize, j: usize) -> usize {
    let (i, j) = if i < j { (i, j) } else { (j, i) };
    i * (2 * size - i - 1) / 2 + (j - i - 1)
}

/// Symmetric n×n matrix of distances in [0, 1] with a zero diagonal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceMatrix {
    size: usize,
    /// Upper triangle, row-major, diagonal excluded
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// All-zero matrix of the given size.
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            values: vec![0.0; size * size.saturating_sub(1) / 2],
        }
    }

    /// Build from nested rows, checking that the input is square.
    ///
    /// Only the upper triangle is read.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let size = rows.len();
        let mut matrix = Self::zeros(size);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != size {
                return Err(AliasError::MatrixShape {
                    expected: size,
                    got: row.len(),
                });
            }
            for (j, &value) in row.iter().enumerate().skip(i + 1) {
                matrix.set(i, j, value);
            }
        }
        Ok(matrix)
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Distance between rows `i` and `j`; 0 on the diagonal.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i == j {
            0.0
        } else {
            self.values[condensed_index(self.size, i, j)]
        }
    }

    /// Set the distance for the pair `{i, j}`. Diagonal writes are ignored.
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        if i != j {
            self.values[condensed_index(self.size, i, j)] = value;
        }
    }

    /// The stored upper triangle.
    pub fn condensed(&self) -> &[f64] {
        &self.values
    }
}

/// Build the distance matrix with an arbitrary pairwise measure.
///
/// `distance` is called once per unordered pair `i < j`.
pub fn build_distance_matrix_with<F>(records: &[NormalizedRecord], distance: F) -> DistanceMatrix
where
    F: Fn(&NormalizedRecord, &NormalizedRecord) -> f64,
{
    let n = records.len();
    let mut matrix = DistanceMatrix::zeros(n);

    for i in 0..n {
        for j in (i + 1)..n {
            matrix.set(i, j, distance(&records[i], &records[j]));
        }
        tracing::trace!(row = i, total = n, "scored matrix row");
    }

    matrix
}

/// Build the distance matrix with a [`PairwiseScorer`].
pub fn build_distance_matrix(records: &[NormalizedRecord], scorer: &PairwiseScorer) -> DistanceMatrix {
    build_distance_matrix_with(records, |a, b| scorer.distance(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(login: &str) -> NormalizedRecord {
        NormalizedRecord {
            login: login.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_matrix() {
        let matrix = build_distance_matrix(&[], &PairwiseScorer::default());
        assert!(matrix.is_empty());
        assert!(matrix.condensed().is_empty());
    }

    #[test]
    fn test_condensed_layout() {
        let size = 5;
        let mut seen = vec![false; size * (size - 1) / 2];
        for i in 0..size {
            for j in (i + 1)..size {
                let k = condensed_index(size, i, j);
                assert_eq!(k, condensed_index(size, j, i));
                assert!(!seen[k]);
                seen[k] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_callback_called_for_upper_triangle_only() {
        let records = vec![record("aaa"), record("bbb"), record("ccc"), record("ddd")];
        let calls = std::cell::Cell::new(0);
        let matrix = build_distance_matrix_with(&records, |_, _| {
            calls.set(calls.get() + 1);
            0.5
        });
        assert_eq!(calls.get(), 6);
        assert_eq!(matrix.condensed().len(), 6);
        assert_eq!(matrix.get(0, 0), 0.0);
        assert_eq!(matrix.get(3, 1), 0.5);
        assert_eq!(matrix.get(1, 3), 0.5);
    }

    #[test]
    fn test_scorer_matrix() {
        let records = vec![record("jsmith"), record("jsmith"), record("octocat")];
        let matrix = build_distance_matrix(&records, &PairwiseScorer::default());
        assert_eq!(matrix.get(0, 1), 0.0);
        assert!(matrix.get(0, 2) > 0.5);
        assert_eq!(matrix.get(2, 0), matrix.get(0, 2));
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let err = DistanceMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0]]).unwrap_err();
        assert!(matches!(err, AliasError::MatrixShape { expected: 2, got: 1 }));
    }
}
