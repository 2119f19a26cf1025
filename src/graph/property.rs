//! Attribute values for graph nodes
//!
//! Ingested records are flat, so values are scalars only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Scalar attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

impl PropertyValue {
    /// Null, or a string that is empty after trimming.
    ///
    /// Tabular sources write missing cells either way, so both count as absent.
    pub fn is_absent(&self) -> bool {
        match self {
            PropertyValue::Null => true,
            PropertyValue::String(s) => s.trim().is_empty(),
            PropertyValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Get string value if this is a string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value; numeric strings are parsed
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Integer(i) => Some(*i as f64),
            PropertyValue::Float(f) => Some(*f),
            PropertyValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Canonical identity string used by the key index.
    ///
    /// Integral floats collapse to their integer form so that `7`, `7.0` and
    /// `"7"` name the same node; loaders that widen id columns to floats
    /// (any column with a gap does) still resolve.
    pub fn key_string(&self) -> Option<String> {
        if self.is_absent() {
            return None;
        }
        match self {
            PropertyValue::String(s) => Some(s.trim().to_string()),
            PropertyValue::Integer(i) => Some(i.to_string()),
            PropertyValue::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => {
                Some((*f as i64).to_string())
            }
            PropertyValue::Float(f) => Some(f.to_string()),
            _ => None,
        }
    }

    /// Plain JSON rendering (no enum tagging)
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PropertyValue::String(s) => serde_json::Value::String(s.clone()),
            PropertyValue::Integer(i) => serde_json::Value::from(*i),
            PropertyValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            PropertyValue::Boolean(b) => serde_json::Value::Bool(*b),
            PropertyValue::Null => serde_json::Value::Null,
        }
    }

    /// Convert a JSON scalar; arrays and objects have no flat representation
    pub fn from_json(value: &serde_json::Value) -> Option<PropertyValue> {
        match value {
            serde_json::Value::Null => Some(PropertyValue::Null),
            serde_json::Value::Bool(b) => Some(PropertyValue::Boolean(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Some(PropertyValue::Integer(i)),
                None => n.as_f64().map(PropertyValue::Float),
            },
            serde_json::Value::String(s) => Some(PropertyValue::String(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    /// Get type name as string
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "String",
            PropertyValue::Integer(_) => "Integer",
            PropertyValue::Float(_) => "Float",
            PropertyValue::Boolean(_) => "Boolean",
            PropertyValue::Null => "Null",
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "{}", s),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Float(fl) => write!(f, "{}", fl),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::Null => write!(f, "null"),
        }
    }
}

// Convenience conversions
impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        PropertyValue::Integer(i as i64)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Boolean(b)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(PropertyValue::Null)
    }
}

/// Attribute map of a node; ordered so snapshots compare and print stably
pub type PropertyMap = BTreeMap<String, PropertyValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_value_conversions() {
        let string_prop: PropertyValue = "hello".into();
        assert_eq!(string_prop.as_string(), Some("hello"));

        let int_prop: PropertyValue = 42i64.into();
        assert_eq!(int_prop, PropertyValue::Integer(42));

        let float_prop: PropertyValue = 3.5.into();
        assert_eq!(float_prop, PropertyValue::Float(3.5));

        let bool_prop: PropertyValue = true.into();
        assert_eq!(bool_prop, PropertyValue::Boolean(true));

        let none: PropertyValue = Option::<i64>::None.into();
        assert_eq!(none, PropertyValue::Null);
    }

    #[test]
    fn test_absent_values() {
        assert!(PropertyValue::Null.is_absent());
        assert!(PropertyValue::from("   ").is_absent());
        assert!(PropertyValue::Float(f64::NAN).is_absent());
        assert!(!PropertyValue::from("A1").is_absent());
        assert!(!PropertyValue::Integer(0).is_absent());
    }

    #[test]
    fn test_key_string_canonicalization() {
        assert_eq!(PropertyValue::Integer(7).key_string().as_deref(), Some("7"));
        assert_eq!(PropertyValue::Float(7.0).key_string().as_deref(), Some("7"));
        assert_eq!(PropertyValue::from(" A1 ").key_string().as_deref(), Some("A1"));
        assert_eq!(PropertyValue::from("").key_string(), None);
        assert_eq!(PropertyValue::Boolean(true).key_string(), None);
    }

    #[test]
    fn test_numeric_view() {
        assert_eq!(PropertyValue::Integer(9000).to_f64(), Some(9000.0));
        assert_eq!(PropertyValue::from("120.50").to_f64(), Some(120.5));
        assert_eq!(PropertyValue::from("n/a").to_f64(), None);
    }

    #[test]
    fn test_json_round_trip_of_scalars() {
        let json = serde_json::json!({"a": 1, "b": 2.5, "c": "x", "d": null, "e": [1]});
        let obj = json.as_object().unwrap();
        assert_eq!(PropertyValue::from_json(&obj["a"]), Some(PropertyValue::Integer(1)));
        assert_eq!(PropertyValue::from_json(&obj["b"]), Some(PropertyValue::Float(2.5)));
        assert_eq!(PropertyValue::from_json(&obj["c"]), Some("x".into()));
        assert_eq!(PropertyValue::from_json(&obj["d"]), Some(PropertyValue::Null));
        assert_eq!(PropertyValue::from_json(&obj["e"]), None);
        assert_eq!(PropertyValue::Integer(1).to_json(), serde_json::json!(1));
    }
}
