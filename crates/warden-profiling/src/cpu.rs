//! CPU profiling delegates.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use warden_protocols::envelope::PROFILING_CPU;
use warden_protocols::{Envelope, Feature, FeatureError, Transport};

use crate::profiler::{DelegateState, Profiler};
use crate::stats::process_cpu_time;

/// How long one capture observes the process.
const SAMPLE_WINDOW: Duration = Duration::from_millis(100);

fn cpu_report(name: &str, wall: Duration, cpu: Option<Duration>) -> serde_json::Value {
    serde_json::json!({
        "profiler": name,
        "timestamp": Utc::now().to_rfc3339(),
        "wall_time_ms": wall.as_millis() as u64,
        "cpu_time_ms": cpu.map(|d| d.as_millis() as u64),
    })
}

async fn observe_window() -> (Duration, Option<Duration>) {
    let cpu_before = process_cpu_time();
    let started = Instant::now();
    tokio::time::sleep(SAMPLE_WINDOW).await;
    let wall = started.elapsed();

    let cpu = match (cpu_before, process_cpu_time()) {
        (Some(before), Some(after)) => Some(after.saturating_sub(before)),
        _ => None,
    };
    (wall, cpu)
}

/// Inspector-based CPU profiler.
///
/// Attaches a call-stack sample from the runtime's introspection surface to
/// each report.
pub struct CpuProfiler {
    transport: Arc<dyn Transport>,
    state: DelegateState,
}

impl CpuProfiler {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            state: DelegateState::Created,
        }
    }
}

#[async_trait]
impl Feature for CpuProfiler {
    fn name(&self) -> &str {
        "cpu-inspector"
    }

    async fn init(&mut self) -> Result<(), FeatureError> {
        self.state.init("cpu-inspector")?;
        debug!("Inspector CPU profiler ready");
        Ok(())
    }

    async fn destroy(&mut self) -> Result<(), FeatureError> {
        self.state.destroy();
        Ok(())
    }
}

#[async_trait]
impl Profiler for CpuProfiler {
    async fn capture(&mut self) -> Result<(), FeatureError> {
        self.state.require_initialized("cpu-inspector")?;

        let (wall, cpu) = observe_window().await;
        let mut report = cpu_report("cpu-inspector", wall, cpu);
        report["stack"] = serde_json::Value::from(
            std::backtrace::Backtrace::force_capture().to_string(),
        );

        self.transport.send(Envelope::new(PROFILING_CPU, report));
        Ok(())
    }
}

/// Portable CPU profiler.
///
/// Reduced fidelity: reports wall-clock and process CPU time over the
/// capture window, no call stacks.
pub struct CpuProfilerFallback {
    transport: Arc<dyn Transport>,
    state: DelegateState,
}

impl CpuProfilerFallback {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            state: DelegateState::Created,
        }
    }
}

#[async_trait]
impl Feature for CpuProfilerFallback {
    fn name(&self) -> &str {
        "cpu-fallback"
    }

    async fn init(&mut self) -> Result<(), FeatureError> {
        self.state.init("cpu-fallback")?;
        debug!("Fallback CPU profiler ready");
        Ok(())
    }

    async fn destroy(&mut self) -> Result<(), FeatureError> {
        self.state.destroy();
        Ok(())
    }
}

#[async_trait]
impl Profiler for CpuProfilerFallback {
    async fn capture(&mut self) -> Result<(), FeatureError> {
        self.state.require_initialized("cpu-fallback")?;

        let (wall, cpu) = observe_window().await;
        self.transport
            .send(Envelope::new(PROFILING_CPU, cpu_report("cpu-fallback", wall, cpu)));
        Ok(())
    }
}
