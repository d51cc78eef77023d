use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Typed value of a single telemetry or configuration leaf.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TelemetryValue {
    /// Unsigned integer (uint8..uint64 leaves, counters).
    Counter(u64),

    /// Signed integer.
    Integer(i64),

    /// Floating point or decimal64 value.
    Gauge(f64),

    /// String, enumeration or identityref value.
    Text(String),

    /// Boolean value.
    Boolean(bool),

    /// Binary data.
    Binary(Vec<u8>),

    /// A JSON subtree (containers and lists).
    Json(serde_json::Value),
}

impl TelemetryValue {
    /// Return the string payload if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TelemetryValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the value's runtime type.
    pub fn type_name(&self) -> &'static str {
        match self {
            TelemetryValue::Counter(_) => "uint",
            TelemetryValue::Integer(_) => "int",
            TelemetryValue::Gauge(_) => "double",
            TelemetryValue::Text(_) => "string",
            TelemetryValue::Boolean(_) => "bool",
            TelemetryValue::Binary(_) => "bytes",
            TelemetryValue::Json(_) => "json",
        }
    }

    /// Decode a JSON scalar or subtree into the closest typed value.
    pub fn from_json(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::String(s) => TelemetryValue::Text(s),
            Value::Bool(b) => TelemetryValue::Boolean(b),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    TelemetryValue::Counter(u)
                } else if let Some(i) = n.as_i64() {
                    TelemetryValue::Integer(i)
                } else {
                    TelemetryValue::Gauge(n.as_f64().unwrap_or_default())
                }
            }
            other => TelemetryValue::Json(other),
        }
    }

    /// Render as a JSON value, the form used for JSON_IETF encoded updates.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            TelemetryValue::Counter(u) => Value::from(*u),
            TelemetryValue::Integer(i) => Value::from(*i),
            TelemetryValue::Gauge(f) => Value::from(*f),
            TelemetryValue::Text(s) => Value::from(s.as_str()),
            TelemetryValue::Boolean(b) => Value::from(*b),
            TelemetryValue::Binary(b) => Value::from(b.clone()),
            TelemetryValue::Json(v) => v.clone(),
        }
    }
}

impl fmt::Display for TelemetryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryValue::Counter(u) => write!(f, "{}", u),
            TelemetryValue::Integer(i) => write!(f, "{}", i),
            TelemetryValue::Gauge(g) => write!(f, "{}", g),
            TelemetryValue::Text(s) => write!(f, "{:?}", s),
            TelemetryValue::Boolean(b) => write!(f, "{}", b),
            TelemetryValue::Binary(b) => write!(f, "<{} bytes>", b.len()),
            TelemetryValue::Json(v) => write!(f, "{}", v),
        }
    }
}

impl From<u64> for TelemetryValue {
    fn from(v: u64) -> Self {
        TelemetryValue::Counter(v)
    }
}

impl From<u16> for TelemetryValue {
    fn from(v: u16) -> Self {
        TelemetryValue::Counter(u64::from(v))
    }
}

impl From<i64> for TelemetryValue {
    fn from(v: i64) -> Self {
        TelemetryValue::Integer(v)
    }
}

impl From<f64> for TelemetryValue {
    fn from(v: f64) -> Self {
        TelemetryValue::Gauge(v)
    }
}

impl From<String> for TelemetryValue {
    fn from(v: String) -> Self {
        TelemetryValue::Text(v)
    }
}

impl From<&str> for TelemetryValue {
    fn from(v: &str) -> Self {
        TelemetryValue::Text(v.to_string())
    }
}

impl From<bool> for TelemetryValue {
    fn from(v: bool) -> Self {
        TelemetryValue::Boolean(v)
    }
}

impl From<Vec<u8>> for TelemetryValue {
    fn from(v: Vec<u8>) -> Self {
        TelemetryValue::Binary(v)
    }
}

impl From<serde_json::Value> for TelemetryValue {
    fn from(v: serde_json::Value) -> Self {
        TelemetryValue::Json(v)
    }
}

/// Get the current timestamp in milliseconds since Unix epoch.
///
/// Returns 0 if system time is before Unix epoch (should never happen in practice).
pub fn current_timestamp_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
