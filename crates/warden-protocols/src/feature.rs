//! Feature lifecycle trait.

use async_trait::async_trait;

use crate::error::FeatureError;

/// Lifecycle contract for monitoring features and their delegates.
///
/// Every monitoring capability, whether a feature facade or the delegate
/// implementation it selects, exposes the same two transitions:
/// `init` to arm it and `destroy` to tear it down. `destroy` must be safe
/// to call without a prior `init` and safe to call twice.
#[async_trait]
pub trait Feature: Send + Sync {
    /// Feature name, used in diagnostics.
    fn name(&self) -> &str;

    /// Arm the feature.
    async fn init(&mut self) -> Result<(), FeatureError>;

    /// Tear the feature down, releasing any delegate it instantiated.
    async fn destroy(&mut self) -> Result<(), FeatureError> {
        Ok(())
    }
}
