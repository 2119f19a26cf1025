//! The fixed six-field feature vector

use crate::error::ValidationError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Feature names in their required order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "amount",
    "is_foreign",
    "device_risk",
    "ip_risk",
    "hour",
    "user_connections",
];

pub const FEATURE_COUNT: usize = 6;

/// Numeric features of one transaction.
///
/// Flags are `0.0` / `1.0`; `hour` is 0-23; `user_connections` is a count.
/// Values are kept as `f64` because that is what the scorer consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub amount: f64,
    pub is_foreign: f64,
    pub device_risk: f64,
    pub ip_risk: f64,
    pub hour: f64,
    pub user_connections: f64,
}

impl FeatureVector {
    pub fn new(
        amount: f64,
        is_foreign: bool,
        device_risk: bool,
        ip_risk: bool,
        hour: u32,
        user_connections: usize,
    ) -> Self {
        Self {
            amount,
            is_foreign: flag(is_foreign),
            device_risk: flag(device_risk),
            ip_risk: flag(ip_risk),
            hour: f64::from(hour),
            user_connections: user_connections as f64,
        }
    }

    /// Values in [`FEATURE_NAMES`] order
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.amount,
            self.is_foreign,
            self.device_risk,
            self.ip_risk,
            self.hour,
            self.user_connections,
        ]
    }

    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        let [amount, is_foreign, device_risk, ip_risk, hour, user_connections] = values;
        Self {
            amount,
            is_foreign,
            device_risk,
            ip_risk,
            hour,
            user_connections,
        }
    }

    /// Reject NaN and infinite values, naming the first offending feature
    pub fn ensure_finite(&self) -> Result<(), ValidationError> {
        match FEATURE_NAMES
            .iter()
            .zip(self.to_array())
            .find(|(_, value)| !value.is_finite())
        {
            Some((field, _)) => Err(ValidationError::NonFinite { field: *field }),
            None => Ok(()),
        }
    }

    /// Name/value pairs in [`FEATURE_NAMES`] order
    pub fn to_named(&self) -> IndexMap<String, f64> {
        FEATURE_NAMES
            .iter()
            .zip(self.to_array())
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    /// Build a vector from named values, enforcing the exact field set and order.
    ///
    /// The first offending position decides the error: a name that is not a
    /// feature is `UnexpectedField`, a feature that is absent altogether is
    /// `MissingField`, and a feature that is present elsewhere is `OutOfOrder`.
    pub fn from_named(named: &IndexMap<String, f64>) -> Result<Self, ValidationError> {
        let names: Vec<&str> = named.keys().map(String::as_str).collect();
        let mut values = [0.0; FEATURE_COUNT];

        for (position, expected) in FEATURE_NAMES.iter().copied().enumerate() {
            let Some(&found) = names.get(position) else {
                return Err(ValidationError::MissingField(expected));
            };
            if found != expected {
                if !FEATURE_NAMES.contains(&found) {
                    return Err(ValidationError::UnexpectedField(found.to_string()));
                }
                if !names.contains(&expected) {
                    return Err(ValidationError::MissingField(expected));
                }
                return Err(ValidationError::OutOfOrder {
                    position,
                    expected,
                    found: found.to_string(),
                });
            }
            let value = named[position];
            if !value.is_finite() {
                return Err(ValidationError::NonFinite { field: expected });
            }
            values[position] = value;
        }

        if let Some(extra) = names.get(FEATURE_COUNT) {
            return Err(ValidationError::UnexpectedField(extra.to_string()));
        }
        Ok(Self::from_array(values))
    }
}

fn flag(set: bool) -> f64 {
    if set {
        1.0
    } else {
        0.0
    }
}
