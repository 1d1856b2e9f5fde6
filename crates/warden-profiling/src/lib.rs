//! # Warden Profiling
//!
//! CPU and heap profiling capabilities. The feature facade instantiates one
//! CPU and one heap profiler, each in its inspector-based or portable
//! fallback variant per the capability detector, and forwards the shared
//! lifecycle contract to both.

mod cpu;
mod feature;
mod heap;
mod profiler;
mod stats;

pub use cpu::{CpuProfiler, CpuProfilerFallback};
pub use feature::ProfilingFeature;
pub use heap::{HeapProfiler, HeapProfilerFallback};
pub use profiler::Profiler;
