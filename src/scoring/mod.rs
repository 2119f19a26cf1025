//! Scoring facade
//!
//! The scorer itself is a black box behind the [`Scorer`] trait. The facade
//! validates input before the scorer ever sees it and rejects any answer
//! outside `{0, 1}`.

use crate::config::ScoringConfig;
use crate::error::{FraudResult, ScoringError};
use crate::features::{FeatureVector, FEATURE_COUNT};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Binary classifier over the fixed feature layout
pub trait Scorer: Send + Sync {
    /// Raw prediction; anything other than 0 or 1 is out of domain
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> i64;
}

impl<F> Scorer for F
where
    F: Fn(&[f64; FEATURE_COUNT]) -> i64 + Send + Sync,
{
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> i64 {
        self(features)
    }
}

/// Reference rule scorer: fraud when the amount is above the threshold, the
/// location is foreign, or the IP is risky. Matches the rule the training
/// labels were generated with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdScorer {
    pub amount_threshold: f64,
}

impl Default for ThresholdScorer {
    fn default() -> Self {
        Self::from(&ScoringConfig::default())
    }
}

impl From<&ScoringConfig> for ThresholdScorer {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            amount_threshold: config.amount_threshold,
        }
    }
}

impl Scorer for ThresholdScorer {
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> i64 {
        let [amount, is_foreign, _device_risk, ip_risk, _hour, _connections] = *features;
        i64::from(amount > self.amount_threshold || is_foreign == 1.0 || ip_risk == 1.0)
    }
}

/// Classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FraudLabel {
    Fraud,
    Legitimate,
}

impl FraudLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FraudLabel::Fraud => "fraud",
            FraudLabel::Legitimate => "legitimate",
        }
    }
}

impl fmt::Display for FraudLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i64> for FraudLabel {
    type Error = ScoringError;

    fn try_from(output: i64) -> Result<Self, Self::Error> {
        match output {
            1 => Ok(FraudLabel::Fraud),
            0 => Ok(FraudLabel::Legitimate),
            output => Err(ScoringError::OutOfDomain { output }),
        }
    }
}

/// Validates vectors and maps scorer output to labels
pub struct ScoringFacade<S = ThresholdScorer> {
    scorer: S,
}

impl<S: Scorer> ScoringFacade<S> {
    pub fn new(scorer: S) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Score a typed vector; non-finite values are rejected before the scorer runs
    pub fn classify(&self, vector: &FeatureVector) -> FraudResult<FraudLabel> {
        vector.ensure_finite()?;
        let output = self.scorer.predict(&vector.to_array());
        let label = FraudLabel::try_from(output)?;
        info!("Classified {:?} as {}", vector.to_array(), label);
        Ok(label)
    }

    /// Validate a name-to-value map into the fixed layout, then score it.
    ///
    /// The scorer is not invoked when validation fails.
    pub fn classify_named(&self, features: &IndexMap<String, f64>) -> FraudResult<FraudLabel> {
        let vector = FeatureVector::from_named(features)?;
        self.classify(&vector)
    }
}

impl Default for ScoringFacade<ThresholdScorer> {
    fn default() -> Self {
        Self::new(ThresholdScorer::default())
    }
}

impl<S> fmt::Debug for ScoringFacade<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoringFacade")
            .field("scorer", &std::any::type_name::<S>())
            .finish()
    }
}
