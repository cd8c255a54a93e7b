//! Field cleaning for tab-separated rows.

use serde_json::Value;

/// Flattens a string onto one line with no tabs, then trims it.
pub fn sanitize(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ").trim().to_string()
}

/// Sanitizes any JSON value. Falsy values (null, `false`, `0`, empty
/// strings and collections) become an empty field.
pub fn sanitize_value(value: &Value) -> String {
    if !truthy(value) {
        return String::new();
    }
    match value {
        Value::String(s) => sanitize(s),
        other => sanitize(&other.to_string()),
    }
}

pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
