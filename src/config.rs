//! Dataset construction settings.
//!
//! One immutable value, validated once by [`crate::dataset::DatasetBuilder::new`]
//! and passed explicitly. A JSON config file may set any subset of fields;
//! the rest keep their defaults.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::board::symmetry::SymmetryCount;
use crate::nn::features::FeatureSetPolicy;

/// Reserve size per side in a standard game.
pub const MAX_RESERVE_PER_SIDE: u32 = 15;

/// Errors raised for settings outside their documented domains.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("discount_factor must be in (0, 1], got {0}")]
    DiscountFactor(f64),

    #[error("symmetry_count must be 1, 4 or 8, got {0}")]
    SymmetryCount(usize),

    #[error("max_reserve_per_side must be positive")]
    MaxReserve,

    #[error("progress_interval must be positive")]
    ProgressInterval,

    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration for a dataset build.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetConfig {
    /// Per-move decay of the game outcome, in (0, 1].
    pub discount_factor: f64,
    /// Only games where both players are listed are used. Empty disables filtering.
    pub participant_filter: BTreeSet<String>,
    /// Feature layout. `feature_set` is accepted as a shorter key.
    #[serde(alias = "feature_set")]
    pub feature_set_policy: FeatureSetPolicy,
    /// Symmetric copies per position: 1, 4 (rotations) or 8 (full group).
    pub symmetry_count: usize,
    /// Spheres each side starts with.
    pub max_reserve_per_side: u32,
    /// Seed for the final shuffle (0 = use entropy).
    pub seed: u64,
    /// Games between progress log lines.
    pub progress_interval: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig {
            discount_factor: 0.99,
            participant_filter: BTreeSet::new(),
            feature_set_policy: FeatureSetPolicy::Aggregate,
            symmetry_count: 1,
            max_reserve_per_side: MAX_RESERVE_PER_SIDE,
            seed: 0,
            progress_interval: 10_000,
        }
    }
}

impl DatasetConfig {
    /// Parses a config from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        DatasetConfig::from_json_str(&data)
    }

    /// Checks every field and returns the parsed symmetry count.
    pub fn validate(&self) -> Result<SymmetryCount, ConfigError> {
        let d = self.discount_factor;
        if !(d > 0.0 && d <= 1.0) {
            return Err(ConfigError::DiscountFactor(d));
        }
        if self.max_reserve_per_side == 0 {
            return Err(ConfigError::MaxReserve);
        }
        if self.progress_interval == 0 {
            return Err(ConfigError::ProgressInterval);
        }
        SymmetryCount::from_count(self.symmetry_count)
            .ok_or(ConfigError::SymmetryCount(self.symmetry_count))
    }

    /// True when the game's players pass the participant filter.
    pub fn accepts_players(&self, light: &str, dark: &str) -> bool {
        self.participant_filter.is_empty()
            || (self.participant_filter.contains(light) && self.participant_filter.contains(dark))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = DatasetConfig::default();
        assert_eq!(config.validate().unwrap(), SymmetryCount::One);
        assert_eq!(config.max_reserve_per_side, 15);
    }

    #[test]
    fn discount_domain() {
        for bad in [0.0, -0.5, 1.0001, f64::NAN, f64::INFINITY] {
            let config = DatasetConfig {
                discount_factor: bad,
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::DiscountFactor(_))),
                "{} should be rejected",
                bad
            );
        }
        let one = DatasetConfig {
            discount_factor: 1.0,
            ..Default::default()
        };
        assert!(one.validate().is_ok());
    }

    #[test]
    fn symmetry_count_domain() {
        for (count, ok) in [(0, false), (1, true), (2, false), (4, true), (8, true), (16, false)] {
            let config = DatasetConfig {
                symmetry_count: count,
                ..Default::default()
            };
            assert_eq!(config.validate().is_ok(), ok, "symmetry_count {}", count);
        }
    }

    #[test]
    fn zero_reserve_and_interval_rejected() {
        let config = DatasetConfig {
            max_reserve_per_side: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MaxReserve)));

        let config = DatasetConfig {
            progress_interval: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ProgressInterval)));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = DatasetConfig::from_json_str(
            r#"{"discount_factor":0.98,"feature_set":"spatial","participant_filter":["mm4","mm6"]}"#,
        )
        .unwrap();
        assert_eq!(config.discount_factor, 0.98);
        assert_eq!(config.feature_set_policy, FeatureSetPolicy::Spatial);
        assert_eq!(config.participant_filter.len(), 2);
        assert_eq!(config.symmetry_count, 1);
        assert_eq!(config.progress_interval, 10_000);
    }

    #[test]
    fn parses_documented_option_names() {
        let config = DatasetConfig::from_json_str(
            r#"{
                "discount_factor": 0.95,
                "participant_filter": ["mm4"],
                "feature_set_policy": "spatial",
                "symmetry_count": 8,
                "max_reserve_per_side": 15
            }"#,
        )
        .unwrap();
        assert_eq!(config.discount_factor, 0.95);
        assert!(config.participant_filter.contains("mm4"));
        assert_eq!(config.feature_set_policy, FeatureSetPolicy::Spatial);
        assert_eq!(config.symmetry_count, 8);
        assert_eq!(config.validate().unwrap(), SymmetryCount::Eight);
    }

    #[test]
    fn unknown_fields_and_policies_rejected() {
        assert!(matches!(
            DatasetConfig::from_json_str(r#"{"epochs":50}"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            DatasetConfig::from_json_str(r#"{"feature_set_policy":"windowed"}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn participant_filter() {
        let open = DatasetConfig::default();
        assert!(open.accepts_players("anyone", "else"));

        let config = DatasetConfig {
            participant_filter: ["mm4", "mm6"].iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };
        assert!(config.accepts_players("mm4", "mm6"));
        assert!(config.accepts_players("mm6", "mm6"));
        assert!(!config.accepts_players("mm4", "bf"));
        assert!(!config.accepts_players("bf", "mm6"));
    }
}
