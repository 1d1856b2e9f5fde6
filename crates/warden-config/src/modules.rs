//! Module enablement registry.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::warn;

use warden_protocols::envelope::MODULE_CONFIGURATION;
use warden_protocols::{jsonize, Envelope, Transport};

/// Process-wide record of which monitoring modules are enabled.
///
/// `configure_module` is idempotent: repeat calls with the same flags leave
/// the map untouched and emit nothing. When the effective map changes, a
/// `module:configuration` envelope carrying the full map is sent so the
/// backend observes enablement transitions.
pub struct ModuleRegistry {
    flags: Mutex<BTreeMap<String, bool>>,
    transport: Mutex<Option<Arc<dyn Transport>>>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            flags: Mutex::new(BTreeMap::new()),
            transport: Mutex::new(None),
        }
    }

    /// Shared agent-wide registry.
    pub fn global() -> Arc<ModuleRegistry> {
        static GLOBAL: OnceLock<Arc<ModuleRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(ModuleRegistry::new())).clone()
    }

    /// Attach the transport that module-status envelopes are sent through.
    pub fn attach_transport(&self, transport: Arc<dyn Transport>) {
        *self.transport.lock().expect("module registry poisoned") = Some(transport);
    }

    /// Merge module-enable flags into the registry.
    pub fn configure_module(&self, flags: &[(&str, bool)]) {
        let mut changed = false;
        let snapshot = {
            let mut map = self.flags.lock().expect("module registry poisoned");
            for (name, enabled) in flags {
                if name.is_empty() {
                    warn!("Ignoring module flag with empty name");
                    continue;
                }
                if map.insert(name.to_string(), *enabled) != Some(*enabled) {
                    changed = true;
                }
            }
            map.clone()
        };

        if changed {
            if let Some(transport) = self.transport.lock().expect("module registry poisoned").as_ref()
            {
                transport.send(Envelope::new(MODULE_CONFIGURATION, jsonize(&snapshot)));
            }
        }
    }

    /// Whether a module is currently enabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.flags
            .lock()
            .expect("module registry poisoned")
            .get(name)
            .copied()
            .unwrap_or(false)
    }

    /// Current flag map.
    pub fn snapshot(&self) -> BTreeMap<String, bool> {
        self.flags.lock().expect("module registry poisoned").clone()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    struct RecordingTransport {
        envelopes: StdMutex<Vec<Envelope>>,
    }

    impl RecordingTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                envelopes: StdMutex::new(Vec::new()),
            })
        }

        fn count(&self) -> usize {
            self.envelopes.lock().unwrap().len()
        }
    }

    impl Transport for RecordingTransport {
        fn send(&self, envelope: Envelope) {
            self.envelopes.lock().unwrap().push(envelope);
        }
    }

    #[test]
    fn test_configure_module_sets_flags() {
        let registry = ModuleRegistry::new();
        registry.configure_module(&[("error", true), ("heapdump", false)]);
        assert!(registry.is_enabled("error"));
        assert!(!registry.is_enabled("heapdump"));
        assert!(!registry.is_enabled("unknown"));
    }

    #[test]
    fn test_configure_module_is_idempotent() {
        let registry = ModuleRegistry::new();
        let transport = RecordingTransport::new();
        registry.attach_transport(transport.clone());

        registry.configure_module(&[("error", true)]);
        assert_eq!(transport.count(), 1);

        // Same flags again: no change, no envelope.
        registry.configure_module(&[("error", true)]);
        assert_eq!(transport.count(), 1);

        registry.configure_module(&[("error", false)]);
        assert_eq!(transport.count(), 2);
    }

    #[test]
    fn test_status_envelope_carries_full_map() {
        let registry = ModuleRegistry::new();
        let transport = RecordingTransport::new();
        registry.attach_transport(transport.clone());

        registry.configure_module(&[("error", true)]);
        registry.configure_module(&[("heapdump", true)]);

        let envelopes = transport.envelopes.lock().unwrap();
        let last = envelopes.last().unwrap();
        assert_eq!(last.event_type, MODULE_CONFIGURATION);
        assert_eq!(last.data["error"], true);
        assert_eq!(last.data["heapdump"], true);
    }

    #[test]
    fn test_empty_flag_name_ignored() {
        let registry = ModuleRegistry::new();
        registry.configure_module(&[("", true)]);
        assert!(registry.snapshot().is_empty());
    }
}
