//! Dynamic config values and their comparison rules
//!
//! Config values are arbitrary JSON-like data. Comparisons follow loose
//! equality: `true == 1`, `123 == "123"`, `null == ""`, so that values which
//! round-trip through storage as a different scalar type do not show up as
//! changes.

use serde_json::Value;

/// Values of one config, keyed by code.
pub type Values = serde_json::Map<String, Value>;

/// Loose equality between two values.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Bool(x), _) => *x == is_truthy(b),
        (_, Value::Bool(y)) => is_truthy(a) == *y,
        (Value::Null, Value::Null) => true,
        (Value::Null, other) | (other, Value::Null) => is_empty_value(other) && !is_zero_string(other),
        (Value::Number(_), Value::Number(_)) => numbers_eq(a, b),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            match parse_numeric(s) {
                Some(parsed) => n.as_f64() == Some(parsed),
                None => n.to_string() == *s,
            }
        }
        (Value::String(x), Value::String(y)) => match (parse_numeric(x), parse_numeric(y)) {
            (Some(p), Some(q)) => p == q,
            _ => x == y,
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| loose_eq(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(key, l)| y.get(key).is_some_and(|r| loose_eq(l, r)))
        }
        (Value::Array(list), Value::Object(map)) | (Value::Object(map), Value::Array(list)) => {
            list.len() == map.len()
                && list
                    .iter()
                    .enumerate()
                    .all(|(i, l)| map.get(&i.to_string()).is_some_and(|r| loose_eq(l, r)))
        }
        _ => false,
    }
}

/// Whether a value counts as empty: null, false, 0, "", "0", or an empty list/map.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Boolean coercion of a value.
pub fn is_truthy(value: &Value) -> bool {
    !is_empty_value(value)
}

/// String form of a value stored in the indexed side table.
///
/// Booleans become `"1"`/`"0"`, lists and maps are JSON encoded and null is
/// the empty string.
pub fn index_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

// "0" is empty but not equal to null
fn is_zero_string(value: &Value) -> bool {
    matches!(value, Value::String(s) if s == "0")
}

fn numbers_eq(a: &Value, b: &Value) -> bool {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x == y,
        _ => a.as_f64() == b.as_f64(),
    }
}

fn parse_numeric(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty()
        || !trimmed.bytes().any(|b| b.is_ascii_digit())
        || !trimmed
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'+' | b'-' | b'e' | b'E'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok()
}
