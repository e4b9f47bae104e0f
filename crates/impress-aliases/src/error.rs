//! Error types for impress-aliases
//!
//! Only structural problems are errors. Missing or odd field values degrade
//! the affected similarity signal instead.

use thiserror::Error;

/// Result type alias for alias resolution
pub type Result<T> = std::result::Result<T, AliasError>;

/// Main error type for alias resolution
#[derive(Error, Debug)]
pub enum AliasError {
    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV input or output failure
    #[cfg(feature = "csv")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required input column is absent
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Configuration file could not be parsed as TOML
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration value that cannot be clamped into range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input exceeds the configured pairwise scoring cap
    #[error("Too many records: {count} exceeds the limit of {max}")]
    TooManyRecords { count: usize, max: usize },

    /// Row index outside the roster
    #[error("Row {row} out of range (roster has {rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },

    /// Distance matrix and label/record counts disagree
    #[error("Matrix shape mismatch: expected {expected} rows, got {got}")]
    MatrixShape { expected: usize, got: usize },
}
