//! Capability detection: enhanced vs. fallback selection.

#[cfg(test)]
#[path = "capability_tests.rs"]
mod tests;

use std::sync::Arc;

use semver::Version;
use tracing::{debug, warn};

use warden_config::ModuleRegistry;

use crate::runtime::RuntimeInfo;

/// A monitoring capability the agent can provide in two variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Error capture and notification.
    Notify,
    /// CPU profiling.
    CpuProfiling,
    /// Heap profiling.
    HeapProfiling,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Notify => write!(f, "notify"),
            Capability::CpuProfiling => write!(f, "profiling:cpu"),
            Capability::HeapProfiling => write!(f, "profiling:heap"),
        }
    }
}

/// Per-feature variant decision, computed once at feature `init` and
/// immutable for the life of the feature instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilitySelection {
    /// Use the enhanced introspection-based implementation.
    pub use_enhanced: bool,
}

/// Decides between the enhanced and fallback implementation of a capability.
///
/// Policy, in order: an explicit force-fallback override always wins; a
/// runtime at or past the default gate (10.0.0) gets enhanced; a runtime at
/// or past the opt-in gate (8.0.0) gets enhanced only with the force-enhanced
/// override; everything else falls back. The detector never fails: missing
/// information means fallback.
pub struct CapabilityDetector {
    runtime: RuntimeInfo,
    modules: Arc<ModuleRegistry>,
}

/// Runtimes at or past this version get enhanced mode unconditionally.
const ENHANCED_GATE: Version = Version::new(10, 0, 0);

/// Runtimes at or past this version get enhanced mode with the override set.
const OPT_IN_GATE: Version = Version::new(8, 0, 0);

impl CapabilityDetector {
    /// Create a detector over a runtime snapshot.
    pub fn new(runtime: RuntimeInfo, modules: Arc<ModuleRegistry>) -> Self {
        Self { runtime, modules }
    }

    /// Select the implementation variant for one capability.
    pub fn select(&self, capability: Capability) -> CapabilitySelection {
        let use_enhanced = self.decide();

        match capability {
            Capability::Notify => {
                // Context capture needs the inspector; say so when the
                // runtime rules it out, but keep going in fallback mode.
                if self.runtime.catch_context && self.version_blocks_enhanced() {
                    warn!(
                        "Inspector is not available on runtime version {}",
                        self.runtime.version
                    );
                }
            }
            Capability::CpuProfiling | Capability::HeapProfiling => {
                if use_enhanced {
                    self.modules.configure_module(&[("heapdump", true)]);
                }
            }
        }

        debug!(
            "Capability {} -> {}",
            capability,
            if use_enhanced { "enhanced" } else { "fallback" }
        );
        CapabilitySelection { use_enhanced }
    }

    fn decide(&self) -> bool {
        if self.runtime.force_fallback {
            return false;
        }
        if self.runtime.version >= ENHANCED_GATE {
            return true;
        }
        if self.runtime.version >= OPT_IN_GATE && self.runtime.force_enhanced {
            return true;
        }
        false
    }

    /// Whether the runtime version alone rules enhanced mode out.
    fn version_blocks_enhanced(&self) -> bool {
        self.runtime.version < OPT_IN_GATE
            || (self.runtime.version < ENHANCED_GATE && !self.runtime.force_enhanced)
    }
}
