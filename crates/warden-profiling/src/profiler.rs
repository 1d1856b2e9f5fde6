//! Profiler delegate contract.

use async_trait::async_trait;

use warden_protocols::{Feature, FeatureError};

/// Lifecycle state shared by the profiler delegates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DelegateState {
    Created,
    Initialized,
    Destroyed,
}

impl DelegateState {
    /// Transition into `Initialized`, rejecting out-of-order calls.
    pub(crate) fn init(&mut self, name: &str) -> Result<(), FeatureError> {
        match self {
            DelegateState::Created => {
                *self = DelegateState::Initialized;
                Ok(())
            }
            DelegateState::Initialized => Err(FeatureError::InitializationFailed(format!(
                "{} already initialized",
                name
            ))),
            DelegateState::Destroyed => Err(FeatureError::AlreadyDestroyed(name.to_string())),
        }
    }

    /// Transition into `Destroyed`. Idempotent, valid from any state.
    pub(crate) fn destroy(&mut self) {
        *self = DelegateState::Destroyed;
    }

    /// Guard an operation that needs a live delegate.
    pub(crate) fn require_initialized(&self, name: &str) -> Result<(), FeatureError> {
        match self {
            DelegateState::Initialized => Ok(()),
            _ => Err(FeatureError::NotInitialized(name.to_string())),
        }
    }
}

/// A CPU or heap profiling delegate.
///
/// Extends the feature lifecycle with `capture`: run one profiling capture
/// and emit its report envelope through the transport. Capture internals
/// (sampling strategy, payload fidelity) are owned by each variant.
#[async_trait]
pub trait Profiler: Feature {
    /// Run one capture and emit its report.
    async fn capture(&mut self) -> Result<(), FeatureError>;
}
