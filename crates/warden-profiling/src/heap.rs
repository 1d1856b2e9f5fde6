//! Heap profiling delegates.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use warden_protocols::envelope::PROFILING_HEAP;
use warden_protocols::{Envelope, Feature, FeatureError, Transport};

use crate::profiler::{DelegateState, Profiler};
use crate::stats::process_memory;

/// Inspector-based heap profiler.
///
/// Produces a heapdump-style snapshot with both virtual and resident sizes.
pub struct HeapProfiler {
    transport: Arc<dyn Transport>,
    state: DelegateState,
}

impl HeapProfiler {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            state: DelegateState::Created,
        }
    }
}

#[async_trait]
impl Feature for HeapProfiler {
    fn name(&self) -> &str {
        "heap-inspector"
    }

    async fn init(&mut self) -> Result<(), FeatureError> {
        self.state.init("heap-inspector")?;
        debug!("Inspector heap profiler ready");
        Ok(())
    }

    async fn destroy(&mut self) -> Result<(), FeatureError> {
        self.state.destroy();
        Ok(())
    }
}

#[async_trait]
impl Profiler for HeapProfiler {
    async fn capture(&mut self) -> Result<(), FeatureError> {
        self.state.require_initialized("heap-inspector")?;

        let memory = process_memory();
        let report = serde_json::json!({
            "profiler": "heap-inspector",
            "timestamp": Utc::now().to_rfc3339(),
            "snapshot": {
                "virtual_bytes": memory.map(|(v, _)| v),
                "resident_bytes": memory.map(|(_, r)| r),
            },
        });

        self.transport.send(Envelope::new(PROFILING_HEAP, report));
        Ok(())
    }
}

/// Portable heap profiler.
///
/// Reduced fidelity: reports resident memory only.
pub struct HeapProfilerFallback {
    transport: Arc<dyn Transport>,
    state: DelegateState,
}

impl HeapProfilerFallback {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            state: DelegateState::Created,
        }
    }
}

#[async_trait]
impl Feature for HeapProfilerFallback {
    fn name(&self) -> &str {
        "heap-fallback"
    }

    async fn init(&mut self) -> Result<(), FeatureError> {
        self.state.init("heap-fallback")?;
        debug!("Fallback heap profiler ready");
        Ok(())
    }

    async fn destroy(&mut self) -> Result<(), FeatureError> {
        self.state.destroy();
        Ok(())
    }
}

#[async_trait]
impl Profiler for HeapProfilerFallback {
    async fn capture(&mut self) -> Result<(), FeatureError> {
        self.state.require_initialized("heap-fallback")?;

        let report = serde_json::json!({
            "profiler": "heap-fallback",
            "timestamp": Utc::now().to_rfc3339(),
            "resident_bytes": process_memory().map(|(_, r)| r),
        });

        self.transport.send(Envelope::new(PROFILING_HEAP, report));
        Ok(())
    }
}
