//! Transport contract.

use crate::envelope::Envelope;

/// Channel that delivers envelopes to the monitoring backend.
///
/// `send` is fire-and-forget: it must never block the caller and its outcome
/// is never surfaced to the faulting code path. Implementations queue the
/// envelope and deliver it from their own control flow; delivery failures are
/// logged, not returned.
pub trait Transport: Send + Sync {
    /// Hand an envelope to the transport. Never blocks, never fails.
    fn send(&self, envelope: Envelope);
}
