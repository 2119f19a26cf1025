//! Runtime configuration
//!
//! Loaded from YAML. Every field has a default, so an empty document (or no
//! file at all) reproduces the stock behaviour:
//!
//! ```yaml
//! features:
//!   home_country: USA
//!   missing_location_policy: domestic
//!   risky_device_types: [Mobile, Tablet]
//!   risky_ip_prefixes: ["198.", "203."]
//! paths:
//!   max_hops: 3
//!   limit: 10
//! scoring:
//!   amount_threshold: 8000.0
//! store:
//!   timeout_ms: 5000
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// How a transaction with no resolvable Location is classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingLocationPolicy {
    /// Unknown location counts as domestic (`is_foreign = 0`)
    #[default]
    Domestic,
    /// Unknown location counts as foreign (`is_foreign = 1`)
    Foreign,
}

/// Feature derivation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Country treated as domestic
    pub home_country: String,
    pub missing_location_policy: MissingLocationPolicy,
    /// Device types that set `device_risk` (exact match)
    pub risky_device_types: Vec<String>,
    /// IP address prefixes that set `ip_risk`
    pub risky_ip_prefixes: Vec<String>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            home_country: "USA".to_string(),
            missing_location_policy: MissingLocationPolicy::Domestic,
            risky_device_types: vec!["Mobile".to_string(), "Tablet".to_string()],
            risky_ip_prefixes: vec!["198.".to_string(), "203.".to_string()],
        }
    }
}

/// Fraud path query defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub max_hops: usize,
    pub limit: usize,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            max_hops: 3,
            limit: 10,
        }
    }
}

/// Reference scorer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Amounts strictly above this are scored as fraud
    pub amount_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            amount_threshold: 8000.0,
        }
    }
}

/// Store access settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Per-call timeout; `None` waits as long as the store does
    pub timeout_ms: Option<u64>,
}

impl StoreConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FraudConfig {
    pub features: FeatureConfig,
    pub paths: PathConfig,
    pub scoring: ScoringConfig,
    pub store: StoreConfig,
}

impl FraudConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: FraudConfig = if yaml.trim().is_empty() {
            FraudConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.features.home_country.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "features.home_country",
                reason: "must not be empty".to_string(),
            });
        }
        if self.paths.max_hops == 0 {
            return Err(ConfigError::Invalid {
                field: "paths.max_hops",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.scoring.amount_threshold.is_finite() {
            return Err(ConfigError::Invalid {
                field: "scoring.amount_threshold",
                reason: "must be a finite number".to_string(),
            });
        }
        Ok(())
    }
}
