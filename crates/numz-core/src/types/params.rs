//! The open key/value bag passed to modules, commands and hook listeners.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::result::AppResult;

/// An ordered, open parameter bag.
///
/// Serializes as a plain JSON object so that it round-trips through the
/// legacy wire shapes unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builds a bag from a JSON value. Non-object values yield an empty bag.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::new(),
        }
    }

    /// Inserts a value, returning the bag for chaining.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Inserts a value.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Gets a raw value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether a non-null value is present under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(|v| !v.is_null())
    }

    /// Gets a string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    /// Gets an integer value, accepting numeric strings as legacy callers send them.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Gets a boolean value.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(|v| v.as_bool())
    }

    /// Gets a required string value.
    pub fn require_str(&self, key: &str) -> AppResult<&str> {
        self.get_str(key)
            .ok_or_else(|| AppError::validation(format!("Missing required parameter '{key}'")))
    }

    /// Gets a required integer value.
    pub fn require_i64(&self, key: &str) -> AppResult<i64> {
        self.get_i64(key)
            .ok_or_else(|| AppError::validation(format!("Missing required parameter '{key}'")))
    }

    /// Iterates over the entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Returns the keys of the bag.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the bag into its map.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Consumes the bag into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<BTreeMap<String, String>> for Params {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(
            map.into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect(),
        )
    }
}

impl FromIterator<(String, Value)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_strings_parse_as_integers() {
        let params = Params::new().with("serviceid", "42").with("qty", 3);
        assert_eq!(params.get_i64("serviceid"), Some(42));
        assert_eq!(params.get_i64("qty"), Some(3));
        assert_eq!(params.get_i64("missing"), None);
    }

    #[test]
    fn test_null_is_not_contained() {
        let params = Params::from_value(json!({ "a": null, "b": "x" }));
        assert!(!params.contains("a"));
        assert!(params.contains("b"));
    }

    #[test]
    fn test_require_reports_key() {
        let err = Params::new().require_str("email").unwrap_err();
        assert!(err.message.contains("email"));
    }

    #[test]
    fn test_non_object_value_is_empty() {
        assert!(Params::from_value(json!([1, 2])).is_empty());
    }
}
