//! # Warden Core
//!
//! Capability negotiation for the Warden agent: probes the hosting runtime
//! (version, override flags, execution mode) and decides, per monitoring
//! capability, between the enhanced introspection-based implementation and
//! the portable fallback.

mod capability;
mod runtime;

pub use capability::{Capability, CapabilityDetector, CapabilitySelection};
pub use runtime::{ExecMode, RuntimeInfo};
