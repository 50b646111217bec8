//! Typed key-value fields attached to log records
//!
//! A [`Field`] is opaque: the constructors are the only way to make one and
//! the value representation never leaks into the public API.

use serde::Serialize;
use std::fmt;

/// Value type carried by a [`Field`]
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldValue {
    String(String),
    Int(isize),
    Int64(i64),
    Float64(f64),
    Bool(bool),
    Any(serde_json::Value),
    Error(String),
}

impl FieldValue {
    /// Convert to serde_json::Value for JSON serialization
    pub(crate) fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) | FieldValue::Error(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::Number((*i as i64).into()),
            FieldValue::Int64(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Float64(f) => float_to_json(*f),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Any(v) => v.clone(),
        }
    }
}

// JSON has no representation for non-finite numbers
fn float_to_json(f: f64) -> serde_json::Value {
    if f.is_nan() {
        serde_json::Value::String("NaN".to_string())
    } else if f.is_infinite() {
        let s = if f.is_sign_positive() { "+Inf" } else { "-Inf" };
        serde_json::Value::String(s.to_string())
    } else {
        serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) | FieldValue::Error(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Int64(i) => write!(f, "{}", i),
            FieldValue::Float64(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Any(v) => write!(f, "{}", v),
        }
    }
}

/// A structured key-value pair for a log record
///
/// Keys are not validated. When the same key appears more than once in a
/// record, the last value wins.
///
/// # Example
///
/// ```
/// use service_logger::Field;
///
/// let fields = [
///     Field::string("user_id", "u-42"),
///     Field::int("attempt", 3),
///     Field::bool("cached", false),
/// ];
/// assert_eq!(fields[0].key(), "user_id");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    key: String,
    value: FieldValue,
}

impl Field {
    fn new(key: impl Into<String>, value: FieldValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, FieldValue::String(value.into()))
    }

    pub fn int(key: impl Into<String>, value: isize) -> Self {
        Self::new(key, FieldValue::Int(value))
    }

    pub fn int64(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, FieldValue::Int64(value))
    }

    pub fn float64(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, FieldValue::Float64(value))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, FieldValue::Bool(value))
    }

    /// Any serializable value, written as nested JSON
    ///
    /// If the value cannot be serialized, the field is recorded as
    /// `"<key>Error"` holding the serializer's message instead.
    pub fn any<T: Serialize + ?Sized>(key: impl Into<String>, value: &T) -> Self {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(json) => Self::new(key, FieldValue::Any(json)),
            Err(e) => Self::new(format!("{}Error", key), FieldValue::String(e.to_string())),
        }
    }

    /// An error under the fixed key `"error"`
    pub fn error(err: &(dyn std::error::Error + '_)) -> Self {
        Self::new("error", FieldValue::Error(err.to_string()))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The value as it will be encoded
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        self.value.to_json_value()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}
