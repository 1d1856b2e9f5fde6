//! # Warden Config
//!
//! Module-enablement configuration store. Features report which monitoring
//! modules they turn on (`error`, `heapdump`, ...) and the backend observes
//! enablement changes through the transport.

mod modules;

pub use modules::ModuleRegistry;
