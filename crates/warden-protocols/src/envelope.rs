//! Transport envelope type.

use serde::{Deserialize, Serialize};

/// Envelope type for exception reports.
pub const PROCESS_EXCEPTION: &str = "process:exception";

/// Envelope type for module enablement status.
pub const MODULE_CONFIGURATION: &str = "module:configuration";

/// Envelope type for CPU profiling reports.
pub const PROFILING_CPU: &str = "profiling:cpu";

/// Envelope type for heap profiling reports.
pub const PROFILING_HEAP: &str = "profiling:heap";

/// Unit of data handed to the transport layer.
///
/// The backend wire protocol is owned by the transport channels; this core
/// only guarantees the `{type, data}` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Event type, e.g. `process:exception`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Serialized payload.
    pub data: serde_json::Value,
}

impl Envelope {
    /// Create a new envelope.
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }

    /// Create a `process:exception` envelope.
    pub fn exception(data: serde_json::Value) -> Self {
        Self::new(PROCESS_EXCEPTION, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_serializes_with_type_key() {
        let env = Envelope::exception(serde_json::json!({"message": "boom"}));
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["type"], "process:exception");
        assert_eq!(json["data"]["message"], "boom");
    }

    #[test]
    fn test_envelope_roundtrip() {
        let env = Envelope::new(PROFILING_CPU, serde_json::json!({"samples": 3}));
        let text = serde_json::to_string(&env).unwrap();
        let back: Envelope = serde_json::from_str(&text).unwrap();
        assert_eq!(back, env);
    }
}
