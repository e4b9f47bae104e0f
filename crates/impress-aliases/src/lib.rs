//! impress-aliases - Alias resolution for contributor rosters
//!
//! Groups user records (name, email, login) that most likely belong to the
//! same person and assigns every group a small, reproducible cluster id.
//!
//! # Pipeline
//!
//! ```text
//! UserRecord -> normalization -> similarity -> matrix -> clustering -> canonical
//! ```
//!
//! - **normalization**: lowercases names, strips punctuation and titles,
//!   splits first/last name, extracts the email local part
//! - **similarity**: combines weighted name and handle signals into one
//!   distance in [0, 1]
//! - **matrix**: dense symmetric pairwise distance matrix
//! - **clustering**: agglomerative merging under a distance threshold
//! - **canonical**: turns raw labels into stable ids ordered by cluster size
//!
//! # Example
//!
//! ```
//! use impress_aliases::{resolve_aliases, AliasConfig, UserRecord};
//!
//! let records = vec![
//!     UserRecord::new(None, Some("j.smith@x.com"), Some("jsmith")),
//!     UserRecord::new(Some("John Smith"), Some("j.smith@x.com"), Some("jsmith2")),
//!     UserRecord::new(Some("Alice Brown"), Some("alice@y.org"), Some("abrown")),
//! ];
//!
//! let resolution = resolve_aliases(&records, &AliasConfig::default()).unwrap();
//! let ids: Vec<_> = resolution.records().iter().map(|r| r.cluster).collect();
//! assert_eq!(ids, vec![Some(0), Some(0), Some(1)]);
//! ```
//!
//! # Scaling
//!
//! Every pair of records is scored, so time and memory grow as O(n²).
//! [`AliasConfig::max_records`] caps the input size.

pub mod canonical;
pub mod clustering;
pub mod config;
pub mod error;
pub mod matrix;
pub mod normalization;
pub mod record;
pub mod resolver;
pub mod similarity;

#[cfg(feature = "csv")]
pub mod csv_io;

pub use canonical::{canonicalize, ClusterMap};
pub use clustering::{AgglomerativeClusterer, Clusterer, Linkage};
pub use config::{AliasConfig, SignalWeights};
pub use error::{AliasError, Result};
pub use matrix::{build_distance_matrix, build_distance_matrix_with, DistanceMatrix};
pub use normalization::{email_local_part, normalize_name, split_name, NameNormalizer};
pub use record::{NormalizedRecord, UserRecord};
pub use resolver::{resolve_aliases, AliasResolver, Resolution, ResolvedRecord};
pub use similarity::{adjust_score, normalized_distance, PairScore, PairwiseScorer, SignalBreakdown};
