//! Error normalization.

use serde_json::Value;

use warden_protocols::{jsonize, ErrorLike};

/// Convert any fault value into the canonical serializable error shape.
///
/// Structured exceptions pass through as-is (message, stack and any extra
/// fields preserved); a bare message or opaque value becomes
/// `{message: value, stack: value}`. Normalization never fails; the output
/// is always serializable.
pub fn normalize(err: &ErrorLike) -> Value {
    match err {
        ErrorLike::Exception(captured) => jsonize(captured),
        ErrorLike::Message(message) => serde_json::json!({
            "message": message,
            "stack": message,
        }),
        ErrorLike::Value(value) => serde_json::json!({
            "message": value,
            "stack": value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_protocols::CapturedError;

    #[test]
    fn test_exception_passes_through() {
        let err = ErrorLike::Exception(
            CapturedError::new("boom")
                .with_stack("at main")
                .with_field("code", Value::from(7)),
        );
        let out = normalize(&err);
        assert_eq!(out["message"], "boom");
        assert_eq!(out["stack"], "at main");
        assert_eq!(out["code"], 7);
    }

    #[test]
    fn test_message_fills_both_fields() {
        let out = normalize(&ErrorLike::from("boom"));
        assert_eq!(out["message"], "boom");
        assert_eq!(out["stack"], "boom");
    }

    #[test]
    fn test_opaque_value_fills_both_fields() {
        let value = serde_json::json!({"weird": [1, 2, 3]});
        let out = normalize(&ErrorLike::Value(value.clone()));
        assert_eq!(out["message"], value);
        assert_eq!(out["stack"], value);
    }
}
