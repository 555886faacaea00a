//! The `{"result": ...}` response envelope every command returns.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

/// Outcome of a command.
///
/// Serializes as `{"result": "success", ...fields}` or
/// `{"result": "error", "message": ...}`.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandEnvelope {
    /// Successful command with its payload fields.
    Success(Map<String, Value>),
    /// Failed command.
    Error {
        /// Human-readable failure reason.
        message: String,
    },
}

impl CommandEnvelope {
    /// A success envelope with no payload.
    pub fn success() -> Self {
        Self::Success(Map::new())
    }

    /// A success envelope carrying `fields`.
    pub fn success_with(fields: Map<String, Value>) -> Self {
        Self::Success(fields)
    }

    /// A success envelope built from a JSON value.
    ///
    /// Objects become the payload fields; `null` and the legacy `"success"`
    /// string mean no payload; any other value is placed under `data`.
    pub fn success_from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self::Success(fields),
            Value::Null => Self::success(),
            Value::String(s) if s.eq_ignore_ascii_case("success") => Self::success(),
            other => {
                let mut fields = Map::new();
                fields.insert("data".to_string(), other);
                Self::Success(fields)
            }
        }
    }

    /// An error envelope.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Whether the command succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Failure message, if this is an error envelope.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            Self::Success(_) => None,
        }
    }

    /// A payload field of a success envelope.
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self {
            Self::Success(fields) => fields.get(field),
            Self::Error { .. } => None,
        }
    }

    /// The envelope as a JSON object.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        match self {
            Self::Success(fields) => {
                map.insert("result".to_string(), Value::from("success"));
                for (key, value) in fields {
                    if key != "result" {
                        map.insert(key.clone(), value.clone());
                    }
                }
            }
            Self::Error { message } => {
                map.insert("result".to_string(), Value::from("error"));
                map.insert("message".to_string(), Value::from(message.as_str()));
            }
        }
        Value::Object(map)
    }
}

impl Serialize for CommandEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success(fields) => {
                let extra = fields.keys().filter(|k| k.as_str() != "result").count();
                let mut map = serializer.serialize_map(Some(extra + 1))?;
                map.serialize_entry("result", "success")?;
                for (key, value) in fields {
                    if key != "result" {
                        map.serialize_entry(key, value)?;
                    }
                }
                map.end()
            }
            Self::Error { message } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("result", "error")?;
                map.serialize_entry("message", message)?;
                map.end()
            }
        }
    }
}
