//! Profiling feature facade.

#[cfg(test)]
#[path = "feature_tests.rs"]
mod tests;

use std::sync::Arc;

use async_trait::async_trait;

use warden_config::ModuleRegistry;
use warden_core::{Capability, CapabilityDetector, RuntimeInfo};
use warden_protocols::{Feature, FeatureError, Transport};

use crate::cpu::{CpuProfiler, CpuProfilerFallback};
use crate::heap::{HeapProfiler, HeapProfilerFallback};
use crate::profiler::Profiler;

/// CPU and heap profiling feature.
///
/// `init` always instantiates both sub-capabilities, each in its inspector
/// or fallback variant per the capability detector. The facade owns both
/// delegates and forwards `destroy` to whichever were created.
pub struct ProfilingFeature {
    runtime: RuntimeInfo,
    transport: Arc<dyn Transport>,
    modules: Arc<ModuleRegistry>,
    force_fallback: bool,
    cpu: Option<Box<dyn Profiler>>,
    heap: Option<Box<dyn Profiler>>,
}

impl ProfilingFeature {
    /// Create the feature. Delegates are instantiated by `init`.
    pub fn new(
        runtime: RuntimeInfo,
        transport: Arc<dyn Transport>,
        modules: Arc<ModuleRegistry>,
    ) -> Self {
        Self {
            runtime,
            transport,
            modules,
            force_fallback: false,
            cpu: None,
            heap: None,
        }
    }

    /// Force the fallback variants regardless of runtime capability.
    pub fn with_force_fallback(mut self) -> Self {
        self.force_fallback = true;
        self
    }

    /// CPU profiler handle, available after `init`.
    pub fn cpu_profiler(&mut self) -> Option<&mut (dyn Profiler + 'static)> {
        self.cpu.as_deref_mut()
    }

    /// Heap profiler handle, available after `init`.
    pub fn heap_profiler(&mut self) -> Option<&mut (dyn Profiler + 'static)> {
        self.heap.as_deref_mut()
    }
}

#[async_trait]
impl Feature for ProfilingFeature {
    fn name(&self) -> &str {
        "profiling"
    }

    async fn init(&mut self) -> Result<(), FeatureError> {
        // The profiling-only override and the explicit argument both coerce
        // the whole feature to fallback.
        let mut runtime = self.runtime.clone();
        if self.force_fallback || runtime.profiling_force_fallback {
            runtime.force_fallback = true;
        }
        let detector = CapabilityDetector::new(runtime, self.modules.clone());

        let mut cpu: Box<dyn Profiler> =
            if detector.select(Capability::CpuProfiling).use_enhanced {
                Box::new(CpuProfiler::new(self.transport.clone()))
            } else {
                Box::new(CpuProfilerFallback::new(self.transport.clone()))
            };
        let mut heap: Box<dyn Profiler> =
            if detector.select(Capability::HeapProfiling).use_enhanced {
                Box::new(HeapProfiler::new(self.transport.clone()))
            } else {
                Box::new(HeapProfilerFallback::new(self.transport.clone()))
            };

        cpu.init().await?;
        heap.init().await?;

        self.cpu = Some(cpu);
        self.heap = Some(heap);
        Ok(())
    }

    async fn destroy(&mut self) -> Result<(), FeatureError> {
        if let Some(mut cpu) = self.cpu.take() {
            cpu.destroy().await?;
        }
        if let Some(mut heap) = self.heap.take() {
            heap.destroy().await?;
        }
        Ok(())
    }
}
