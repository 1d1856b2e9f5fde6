//! Never-failing serialization helper.

use serde::Serialize;
use serde_json::Value;

/// Convert any serializable value into a plain JSON structure.
///
/// Serialization problems degrade to a string rendering instead of an error;
/// callers on fault paths rely on this never raising.
pub fn jsonize<T: Serialize>(value: &T) -> Value {
    match serde_json::to_value(value) {
        Ok(v) => v,
        Err(e) => Value::String(format!("<unserializable value: {}>", e)),
    }
}
