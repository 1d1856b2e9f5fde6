//! Transport errors.

use thiserror::Error;

/// Transport error types.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Envelope could not be serialized for the wire.
    #[error("Envelope serialization failed: {0}")]
    Serialize(String),

    /// Channel-level delivery failure.
    #[error("Delivery failed: {0}")]
    Delivery(String),
}
