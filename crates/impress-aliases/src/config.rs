//! Configuration for alias resolution
//!
//! Thresholds, signal weights, and the banned-token list used by name
//! normalization. Loadable from TOML or JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clustering::Linkage;
use crate::error::{AliasError, Result};

/// Prefixes, suffixes, and titles dropped from names before comparison.
pub const DEFAULT_BANNED_WORDS: [&str; 7] = ["jr", "sr", "dr", "mr", "mrs", "admin", "support"];

/// Default merge threshold for clustering.
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 0.1;

/// Default cap on the number of distinct rows scored pairwise.
///
/// Peak memory is about `8 * n * (n - 1)` bytes: the stored upper triangle
/// plus the clusterer's working copy of it. That is roughly 200 MB at the
/// default cap and grows quadratically beyond it.
pub const DEFAULT_MAX_RECORDS: usize = 5_000;

/// Top-level alias resolution configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasConfig {
    /// Clusters are merged while their linkage distance is <= this value
    pub distance_threshold: f64,
    /// How the distance between two clusters is measured
    pub linkage: Linkage,
    /// Maximum number of distinct rows accepted (0 disables the cap)
    pub max_records: usize,
    /// Whole tokens removed from names (matched case-insensitively)
    pub banned_words: Vec<String>,
    /// Weights of the individual similarity signals
    pub weights: SignalWeights,
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self {
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            linkage: Linkage::Complete,
            max_records: DEFAULT_MAX_RECORDS,
            banned_words: DEFAULT_BANNED_WORDS.iter().map(|w| w.to_string()).collect(),
            weights: SignalWeights::default(),
        }
    }
}

/// Per-signal weights. Each is clamped to [0, 1] before use.
///
/// A weight of 0 disables a signal entirely, 1 uses it as is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalWeights {
    /// Edit distance between full normalized names
    pub full_name_coef: f64,
    /// Mean edit distance of first and last names
    pub part_name_coef: f64,
    /// First and last name both embedded in the other side's email
    pub email_name_coef: f64,
    /// Edit distance between email local parts
    pub email_coef: f64,
    /// Edit distance between logins
    pub login_coef: f64,
    /// Edit distance between one side's login and the other's email local part
    pub login_email_coef: f64,
    /// First and last name both embedded in the other side's login
    pub login_name_coef: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            full_name_coef: 1.0,
            part_name_coef: 1.0,
            email_name_coef: 1.0,
            email_coef: 1.0,
            login_coef: 1.0,
            login_email_coef: 0.0,
            login_name_coef: 0.0,
        }
    }
}

impl SignalWeights {
    /// Copy of these weights with every value clamped to [0, 1].
    ///
    /// NaN is treated as 0 (signal disabled).
    pub fn clamped(&self) -> Self {
        Self {
            full_name_coef: clamp_weight(self.full_name_coef),
            part_name_coef: clamp_weight(self.part_name_coef),
            email_name_coef: clamp_weight(self.email_name_coef),
            email_coef: clamp_weight(self.email_coef),
            login_coef: clamp_weight(self.login_coef),
            login_email_coef: clamp_weight(self.login_email_coef),
            login_name_coef: clamp_weight(self.login_name_coef),
        }
    }
}

/// Clamp a weight into [0, 1]; NaN maps to 0.
pub fn clamp_weight(weight: f64) -> f64 {
    if weight.is_nan() {
        return 0.0;
    }
    weight.clamp(0.0, 1.0)
}

impl AliasConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the merge threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.distance_threshold = threshold;
        self
    }

    /// Replace the signal weights
    pub fn with_weights(mut self, weights: SignalWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| AliasError::InvalidConfig(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load configuration from a file; `.json` is parsed as JSON, anything
    /// else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content)?,
            _ => Self::from_toml(&content)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Weights are never rejected; they are clamped at use.
    pub fn validate(&self) -> Result<()> {
        if !self.distance_threshold.is_finite() {
            return Err(AliasError::InvalidConfig(
                "distance_threshold must be a finite number".to_string(),
            ));
        }
        if self.distance_threshold < 0.0 {
            return Err(AliasError::InvalidConfig(
                "distance_threshold must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AliasConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.distance_threshold, 0.1);
        assert_eq!(config.weights.login_email_coef, 0.0);
        assert_eq!(config.weights.login_name_coef, 0.0);
        assert_eq!(config.banned_words.len(), 7);
    }

    #[test]
    fn test_clamped_weights() {
        let weights = SignalWeights {
            full_name_coef: 2.5,
            part_name_coef: -1.0,
            email_name_coef: f64::NAN,
            ..Default::default()
        }
        .clamped();
        assert_eq!(weights.full_name_coef, 1.0);
        assert_eq!(weights.part_name_coef, 0.0);
        assert_eq!(weights.email_name_coef, 0.0);
        assert_eq!(weights.email_coef, 1.0);
    }

    #[test]
    fn test_toml_partial_override() {
        let config = AliasConfig::from_toml(
            r#"
distance_threshold = 0.25
linkage = "average"

[weights]
login_email_coef = 0.5
"#,
        )
        .unwrap();
        assert_eq!(config.distance_threshold, 0.25);
        assert_eq!(config.linkage, Linkage::Average);
        assert_eq!(config.weights.login_email_coef, 0.5);
        assert_eq!(config.weights.full_name_coef, 1.0);
        assert_eq!(config.max_records, DEFAULT_MAX_RECORDS);
    }

    #[test]
    fn test_json_serialization() {
        let config = AliasConfig::default().with_threshold(0.3);
        let json = config.to_json().unwrap();
        let parsed = AliasConfig::from_json(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(AliasConfig::default().with_threshold(-0.1).validate().is_err());
        assert!(AliasConfig::default().with_threshold(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aliases.toml");
        std::fs::write(&path, "distance_threshold = 0.2\n").unwrap();
        let config = AliasConfig::load(&path).unwrap();
        assert_eq!(config.distance_threshold, 0.2);
    }
}
