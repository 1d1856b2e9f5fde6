//! Enhanced notify delegate.

use std::sync::Arc;

use async_trait::async_trait;

use warden_config::ModuleRegistry;
use warden_core::ExecMode;
use warden_protocols::{Feature, FeatureError, Transport};

use crate::catcher::{CatchOptions, ExceptionCaptureManager, HookRegistry};

/// Introspection-based error capture.
///
/// Selected on runtimes where the inspector is available. Installs the same
/// global hooks as the fallback path, with context capture enabled so each
/// panic report carries the faulting thread's context.
pub struct InspectorNotify {
    registry: Arc<HookRegistry>,
    transport: Arc<dyn Transport>,
    modules: Arc<ModuleRegistry>,
    exec_mode: ExecMode,
    bridge_process_hook: bool,
    manager: Option<Arc<ExceptionCaptureManager>>,
}

impl InspectorNotify {
    /// Create the delegate. Hooks are installed by `init`.
    pub fn new(
        registry: Arc<HookRegistry>,
        transport: Arc<dyn Transport>,
        modules: Arc<ModuleRegistry>,
        exec_mode: ExecMode,
    ) -> Self {
        Self {
            registry,
            transport,
            modules,
            exec_mode,
            bridge_process_hook: true,
            manager: None,
        }
    }

    /// Leave the process panic hook untouched; faults reach the registry
    /// only through explicit dispatch.
    pub fn without_process_hook(mut self) -> Self {
        self.bridge_process_hook = false;
        self
    }
}

#[async_trait]
impl Feature for InspectorNotify {
    fn name(&self) -> &str {
        "notify-inspector"
    }

    async fn init(&mut self) -> Result<(), FeatureError> {
        if self.manager.is_some() {
            return Err(FeatureError::InitializationFailed(
                "inspector notify already initialized".to_string(),
            ));
        }

        let mut manager = ExceptionCaptureManager::new(
            self.registry.clone(),
            self.transport.clone(),
            self.modules.clone(),
            self.exec_mode,
        )
        .with_capture_context();
        if !self.bridge_process_hook {
            manager = manager.without_process_hook();
        }
        let manager = Arc::new(manager);
        manager.catch_all(CatchOptions::default());
        self.manager = Some(manager);
        Ok(())
    }

    async fn destroy(&mut self) -> Result<(), FeatureError> {
        if let Some(manager) = self.manager.take() {
            manager.catch_all(CatchOptions { errors: false });
        }
        Ok(())
    }
}
