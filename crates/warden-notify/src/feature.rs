//! Notify feature facade and severity-filtered notification entry point.

#[cfg(test)]
#[path = "feature_tests.rs"]
mod tests;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use warden_config::ModuleRegistry;
use warden_core::{Capability, CapabilityDetector, RuntimeInfo};
use warden_protocols::{jsonize, Envelope, ErrorLike, Feature, FeatureError, Transport};

use crate::catcher::{CatchOptions, ExceptionCaptureManager, HookRegistry};
use crate::inspector::InspectorNotify;
use crate::severity::Severity;

/// Notify feature configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyOptions {
    /// Severity threshold for `notify_error`.
    #[serde(default = "default_level")]
    pub level: String,

    /// Whether to install global fault hooks.
    #[serde(default = "default_catch_exceptions")]
    pub catch_exceptions: bool,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_catch_exceptions() -> bool {
    true
}

impl Default for NotifyOptions {
    fn default() -> Self {
        Self {
            level: default_level(),
            catch_exceptions: default_catch_exceptions(),
        }
    }
}

/// Outcome of a `notify_error` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Relayed to the transport.
    Sent,
    /// Below the configured threshold.
    Filtered,
    /// Input was not an error value; nothing sent.
    Rejected,
}

/// Handle returned by the notify feature for reporting errors by hand.
#[derive(Clone)]
pub struct NotifyHandle {
    threshold: String,
    transport: Arc<dyn Transport>,
}

impl NotifyHandle {
    fn new(threshold: String, transport: Arc<dyn Transport>) -> Self {
        Self {
            threshold,
            transport,
        }
    }

    /// Report an error, subject to the configured severity threshold.
    ///
    /// An omitted or unrecognized `level` always sends. Otherwise the send
    /// happens iff `index(threshold) >= index(level)` on the severity scale
    /// (an unrecognized threshold sits below every level and filters
    /// everything). The comparison is position-based by contract.
    pub fn notify_error(&self, err: &ErrorLike, level: Option<&str>) -> NotifyOutcome {
        let ErrorLike::Exception(captured) = err else {
            warn!("notify_error should be called with a structured error value");
            return NotifyOutcome::Rejected;
        };

        let incoming = level.and_then(Severity::index_of);
        let Some(incoming) = incoming else {
            self.transport
                .send(Envelope::exception(jsonize(captured)));
            return NotifyOutcome::Sent;
        };

        let threshold = Severity::index_of(&self.threshold)
            .map(|i| i as i64)
            .unwrap_or(-1);
        if threshold >= incoming as i64 {
            self.transport
                .send(Envelope::exception(jsonize(captured)));
            NotifyOutcome::Sent
        } else {
            NotifyOutcome::Filtered
        }
    }
}

/// Error capture and notification feature.
///
/// `init` consults the capability detector: enhanced mode instantiates the
/// inspector delegate, fallback mode installs the in-process hooks. The
/// facade owns whichever it created and releases it on `destroy`.
pub struct NotifyFeature {
    options: NotifyOptions,
    runtime: RuntimeInfo,
    transport: Arc<dyn Transport>,
    modules: Arc<ModuleRegistry>,
    registry: Arc<HookRegistry>,
    bridge_process_hook: bool,
    manager: Option<Arc<ExceptionCaptureManager>>,
    delegate: Option<InspectorNotify>,
    handle: Option<NotifyHandle>,
}

impl NotifyFeature {
    /// Create the feature. Nothing is armed until `init`.
    pub fn new(
        options: NotifyOptions,
        runtime: RuntimeInfo,
        transport: Arc<dyn Transport>,
        modules: Arc<ModuleRegistry>,
        registry: Arc<HookRegistry>,
    ) -> Self {
        Self {
            options,
            runtime,
            transport,
            modules,
            registry,
            bridge_process_hook: true,
            manager: None,
            delegate: None,
            handle: None,
        }
    }

    /// Leave the process panic hook untouched; faults reach the registry
    /// only through explicit dispatch. For embedders that own the hook.
    pub fn without_process_hook(mut self) -> Self {
        self.bridge_process_hook = false;
        self
    }

    /// Notification handle, available after `init`.
    pub fn handle(&self) -> Option<NotifyHandle> {
        self.handle.clone()
    }
}

#[async_trait]
impl Feature for NotifyFeature {
    fn name(&self) -> &str {
        "notify"
    }

    async fn init(&mut self) -> Result<(), FeatureError> {
        if self.options.catch_exceptions {
            let detector =
                CapabilityDetector::new(self.runtime.clone(), self.modules.clone());
            let selection = detector.select(Capability::Notify);

            if selection.use_enhanced {
                let mut delegate = InspectorNotify::new(
                    self.registry.clone(),
                    self.transport.clone(),
                    self.modules.clone(),
                    self.runtime.exec_mode,
                );
                if !self.bridge_process_hook {
                    delegate = delegate.without_process_hook();
                }
                delegate.init().await?;
                self.delegate = Some(delegate);
            } else {
                let mut manager = ExceptionCaptureManager::new(
                    self.registry.clone(),
                    self.transport.clone(),
                    self.modules.clone(),
                    self.runtime.exec_mode,
                );
                if !self.bridge_process_hook {
                    manager = manager.without_process_hook();
                }
                let manager = Arc::new(manager);
                manager.catch_all(CatchOptions::default());
                self.manager = Some(manager);
            }
        }

        self.handle = Some(NotifyHandle::new(
            self.options.level.clone(),
            self.transport.clone(),
        ));
        Ok(())
    }

    async fn destroy(&mut self) -> Result<(), FeatureError> {
        if let Some(mut delegate) = self.delegate.take() {
            delegate.destroy().await?;
        }
        if let Some(manager) = self.manager.take() {
            manager.catch_all(CatchOptions { errors: false });
        }
        Ok(())
    }
}
