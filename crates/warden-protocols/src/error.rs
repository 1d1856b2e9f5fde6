//! Feature-related errors.

use thiserror::Error;

/// Feature lifecycle error types.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Feature used before `init`.
    #[error("Feature not initialized: {0}")]
    NotInitialized(String),

    /// Feature initialization failed.
    #[error("Feature initialization failed: {0}")]
    InitializationFailed(String),

    /// Feature used after `destroy`.
    #[error("Feature already destroyed: {0}")]
    AlreadyDestroyed(String),

    /// Feature teardown failed.
    #[error("Feature destroy failed: {0}")]
    DestroyFailed(String),

    /// Generic error.
    #[error("{0}")]
    Custom(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_initialized_error() {
        let err = FeatureError::NotInitialized("profiling".to_string());
        let display = err.to_string();
        assert!(display.contains("not initialized"));
        assert!(display.contains("profiling"));
    }

    #[test]
    fn test_initialization_failed_error() {
        let err = FeatureError::InitializationFailed("no inspector".to_string());
        assert!(err.to_string().contains("no inspector"));
    }

    #[test]
    fn test_custom_error() {
        let err = FeatureError::Custom("custom error message".to_string());
        assert_eq!(err.to_string(), "custom error message");
    }
}
