//! Tests for capability selection policy.

use super::*;
use crate::runtime::ExecMode;

fn detector(runtime: RuntimeInfo) -> (CapabilityDetector, Arc<ModuleRegistry>) {
    let modules = Arc::new(ModuleRegistry::new());
    (CapabilityDetector::new(runtime, modules.clone()), modules)
}

#[test]
fn test_old_runtime_selects_fallback() {
    let (detector, _) = detector(RuntimeInfo::default().with_version("9.5.0"));
    let selection = detector.select(Capability::Notify);
    assert!(!selection.use_enhanced);
}

#[test]
fn test_new_runtime_selects_enhanced() {
    let (detector, _) = detector(RuntimeInfo::default().with_version("10.1.0"));
    let selection = detector.select(Capability::Notify);
    assert!(selection.use_enhanced);
}

#[test]
fn test_opt_in_gate_with_force_enhanced() {
    let runtime = RuntimeInfo {
        force_enhanced: true,
        ..RuntimeInfo::default().with_version("8.2.0")
    };
    let (detector, _) = detector(runtime);
    assert!(detector.select(Capability::Notify).use_enhanced);
}

#[test]
fn test_opt_in_gate_without_override_falls_back() {
    let (detector, _) = detector(RuntimeInfo::default().with_version("8.2.0"));
    assert!(!detector.select(Capability::Notify).use_enhanced);
}

#[test]
fn test_force_fallback_always_wins() {
    let runtime = RuntimeInfo {
        force_fallback: true,
        force_enhanced: true,
        ..RuntimeInfo::default().with_version("12.0.0")
    };
    let (detector, _) = detector(runtime);
    assert!(!detector.select(Capability::Notify).use_enhanced);
    assert!(!detector.select(Capability::CpuProfiling).use_enhanced);
}

#[test]
fn test_unknown_version_falls_back() {
    let (detector, _) = detector(RuntimeInfo::default());
    assert!(!detector.select(Capability::Notify).use_enhanced);
}

#[test]
fn test_enhanced_profiling_enables_heapdump_module() {
    let (detector, modules) = detector(RuntimeInfo::default().with_version("10.1.0"));
    detector.select(Capability::HeapProfiling);
    assert!(modules.is_enabled("heapdump"));
}

#[test]
fn test_fallback_profiling_leaves_heapdump_off() {
    let (detector, modules) = detector(RuntimeInfo::default().with_version("9.0.0"));
    detector.select(Capability::CpuProfiling);
    detector.select(Capability::HeapProfiling);
    assert!(!modules.is_enabled("heapdump"));
}

#[test]
fn test_notify_selection_never_touches_heapdump() {
    let (detector, modules) = detector(RuntimeInfo::default().with_version("10.1.0"));
    detector.select(Capability::Notify);
    assert!(!modules.is_enabled("heapdump"));
}

#[test]
fn test_exec_mode_does_not_affect_selection() {
    let runtime = RuntimeInfo {
        exec_mode: ExecMode::Cluster,
        ..RuntimeInfo::default().with_version("10.1.0")
    };
    let (detector, _) = detector(runtime);
    assert!(detector.select(Capability::Notify).use_enhanced);
}
