//! Conversion between this crate's `Value` and `serde_json::Value`, used by
//! `$json` and by `Value`'s own `Display` impl for arrays/objects. Rather
//! than hand-rolling a printer the way the teacher's `output.rs` does, this
//! leans on `serde_json` (already a dependency for context deserialization)
//! for correct, minimal-round-trip number formatting.

use std::collections::BTreeMap;

use crate::value::{Number, Value};

pub fn to_serde(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::Value::Number(number_to_serde(n)),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_serde).collect()),
        Value::Object(map) => {
            serde_json::Value::Object(map.iter().map(|(k, v)| (k.clone(), to_serde(v))).collect())
        }
    }
}

fn number_to_serde(n: &Number) -> serde_json::Number {
    if let Some(i) = n.as_i64() {
        serde_json::Number::from(i)
    } else {
        serde_json::Number::from_f64(n.as_f64()).unwrap_or_else(|| serde_json::Number::from(0))
    }
}

pub fn from_serde(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::integer(i)
            } else {
                Value::float(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::Array(items.into_iter().map(from_serde).collect()),
        serde_json::Value::Object(map) => {
            let mut out = BTreeMap::new();
            for (k, v) in map {
                out.insert(k, from_serde(v));
            }
            Value::Object(out)
        }
    }
}

/// Compact JSON text for a value, used by `$json` and by `Value`'s `Display`
/// impl for arrays/objects (scalars format directly without going through
/// serde_json, so numbers keep their integer/float tagging).
pub fn to_json_string(value: &Value) -> String {
    serde_json::to_string(&to_serde(value)).expect("Value never contains non-finite numbers or cycles")
}
