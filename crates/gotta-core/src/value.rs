//! # Value Helpers
//!
//! Truthiness and text coercion for `serde_json::Value`, used by rule
//! functions that only care whether a value was "provided" and what it
//! reads like as text.

use std::borrow::Cow;

use serde_json::Value;

/// Whether a property value counts as provided.
///
/// Absent, `null`, `false`, `0` and `""` are falsy. Every array and object
/// is truthy, including empty ones.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// The text a rule matches against: strings as-is, anything else as its
/// JSON rendering.
pub fn text_of(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}
