//! Fault value shapes accepted by the capture paths.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A captured exception in canonical reportable form.
///
/// `message` and `stack` are always present in the serialized shape (as
/// `null` when unknown); any additional fields attached to the original
/// error are flattened alongside them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapturedError {
    pub message: Option<String>,
    pub stack: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl CapturedError {
    /// Create a captured error with a message and no stack.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Attach a stack representation.
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Attach an additional field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Capture a standard error, folding its source chain into the stack.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut stack = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            stack.push_str("\ncaused by: ");
            stack.push_str(&cause.to_string());
            source = cause.source();
        }
        Self {
            message: Some(err.to_string()),
            stack: Some(stack),
            extra: serde_json::Map::new(),
        }
    }
}

/// Union over the heterogeneous values a fault path may carry.
///
/// Capture must accept a structured exception, a bare message, or an
/// arbitrary opaque value through the same entry point; normalization
/// dispatches per variant and never fails.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorLike {
    /// A structured exception.
    Exception(CapturedError),
    /// A plain message.
    Message(String),
    /// Anything else.
    Value(Value),
}

impl ErrorLike {
    /// Whether this is the structured-exception variant.
    pub fn is_exception(&self) -> bool {
        matches!(self, ErrorLike::Exception(_))
    }

    /// Capture a standard error as the exception variant.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        ErrorLike::Exception(CapturedError::from_error(err))
    }
}

impl From<CapturedError> for ErrorLike {
    fn from(err: CapturedError) -> Self {
        ErrorLike::Exception(err)
    }
}

impl From<String> for ErrorLike {
    fn from(message: String) -> Self {
        ErrorLike::Message(message)
    }
}

impl From<&str> for ErrorLike {
    fn from(message: &str) -> Self {
        ErrorLike::Message(message.to_string())
    }
}

impl From<Value> for ErrorLike {
    fn from(value: Value) -> Self {
        ErrorLike::Value(value)
    }
}
