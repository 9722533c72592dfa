//! Property helpers over loosely-typed webhook JSON.
//!
//! Every accessor returns `None` for an absent key and for a value of the
//! wrong JSON type; nothing here panics.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

pub(crate) type Object = Map<String, Value>;

/// True when `key` holds anything other than `null`.
pub(crate) fn present(obj: &Object, key: &str) -> bool {
    obj.get(key).is_some_and(|v| !v.is_null())
}

pub(crate) fn object<'a>(obj: &'a Object, key: &str) -> Option<&'a Object> {
    obj.get(key).and_then(Value::as_object)
}

pub(crate) fn array<'a>(obj: &'a Object, key: &str) -> Option<&'a Vec<Value>> {
    obj.get(key).and_then(Value::as_array)
}

pub(crate) fn string(obj: &Object, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(String::from)
}

/// Reads an identifier that the platform sends either as a JSON string or
/// as a bare number (`app_id` is the usual offender).
pub(crate) fn id_string(obj: &Object, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn bool_flag(obj: &Object, key: &str) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(false)
}

pub(crate) fn float(obj: &Object, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64)
}

/// Epoch milliseconds to an absolute instant.
pub(crate) fn instant(obj: &Object, key: &str) -> Option<DateTime<Utc>> {
    obj.get(key)
        .and_then(Value::as_i64)
        .and_then(DateTime::from_timestamp_millis)
}

/// `{ "<key>": { "id": "..." } }`, as used by `sender` and `recipient`.
pub(crate) fn nested_id(obj: &Object, key: &str) -> Option<String> {
    object(obj, key).and_then(|o| id_string(o, "id"))
}
