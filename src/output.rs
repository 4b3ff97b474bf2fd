//! Conversions between query values and JSON for the crate's I/O boundary.
//!
//! The CLI reads collections as JSON arrays and prints results as JSON;
//! library callers working with `serde_json` documents can convert whole
//! collections with [`from_json`] and shuttle results back with
//! [`to_json`]. Integer/float distinction survives the round trip where
//! JSON can express it.

use std::collections::HashMap;

use crate::value::Value;

/// Converts a JSON document into a query value.
pub fn from_json(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(items) => Value::List(items.iter().map(from_json).collect()),
        serde_json::Value::Object(map) => {
            let mut out = HashMap::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key.clone(), from_json(item));
            }
            Value::Map(out)
        }
    }
}

/// Converts a query value into a JSON document.
///
/// Floats JSON cannot express (NaN, infinities) become `null`.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Integer(n) => serde_json::Value::Number((*n).into()),
        Value::Float(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::List(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Map(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key.clone(), to_json(item));
            }
            serde_json::Value::Object(out)
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(value: &serde_json::Value) -> Self {
        from_json(value)
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        to_json(value)
    }
}
