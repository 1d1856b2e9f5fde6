//! Exception capture: process-wide fault hooks and their lifecycle.

#[cfg(test)]
#[path = "catcher_tests.rs"]
mod tests;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use serde_json::Value;
use tracing::{error, info};

use warden_config::ModuleRegistry;
use warden_core::ExecMode;
use warden_protocols::{CapturedError, Envelope, ErrorLike, Transport};

use crate::normalize::normalize;

/// Kind of host fault delivered to the hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// A panic no handler caught. Fatal when nothing else listens.
    UncaughtPanic,
    /// An asynchronous task failure nothing observed. Never fatal.
    UnhandledRejection,
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FaultKind::UncaughtPanic => write!(f, "uncaught panic"),
            FaultKind::UnhandledRejection => write!(f, "unhandled rejection"),
        }
    }
}

/// A fault dispatched to registered listeners.
#[derive(Debug, Clone)]
pub struct Fault {
    pub kind: FaultKind,
    /// The value the fault carried, if any.
    pub error: Option<ErrorLike>,
}

/// Callback registered for a fault kind.
pub type FaultListener = Arc<dyn Fn(&Fault) + Send + Sync>;

struct Registered {
    agent_owned: bool,
    listener: FaultListener,
}

#[derive(Default)]
struct RegistryInner {
    listeners: HashMap<FaultKind, Vec<Registered>>,
}

/// Process-wide fault listener registry.
///
/// The runtime's fault dispatch (the panic hook bridge, task supervisors)
/// funnels into [`dispatch`](HookRegistry::dispatch). Listener bodies run
/// sequentially to completion; the host guarantees at most one fault is in
/// flight in agent code at a time. The agent uses the shared
/// [`global`](HookRegistry::global) instance; tests construct their own.
pub struct HookRegistry {
    inner: Mutex<RegistryInner>,
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
        }
    }

    /// Shared process-wide registry.
    pub fn global() -> Arc<HookRegistry> {
        static GLOBAL: OnceLock<Arc<HookRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(HookRegistry::new())).clone()
    }

    /// Register a listener for a fault kind.
    pub fn register(&self, kind: FaultKind, agent_owned: bool, listener: FaultListener) {
        self.inner
            .lock()
            .expect("hook registry poisoned")
            .listeners
            .entry(kind)
            .or_default()
            .push(Registered {
                agent_owned,
                listener,
            });
    }

    /// Remove every listener for a fault kind, foreign ones included.
    pub fn remove_all(&self, kind: FaultKind) {
        self.inner
            .lock()
            .expect("hook registry poisoned")
            .listeners
            .remove(&kind);
    }

    /// Number of listeners currently registered for a kind.
    pub fn listener_count(&self, kind: FaultKind) -> usize {
        self.inner
            .lock()
            .expect("hook registry poisoned")
            .listeners
            .get(&kind)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Number of listeners not owned by the agent.
    pub fn foreign_listener_count(&self, kind: FaultKind) -> usize {
        self.inner
            .lock()
            .expect("hook registry poisoned")
            .listeners
            .get(&kind)
            .map(|l| l.iter().filter(|r| !r.agent_owned).count())
            .unwrap_or(0)
    }

    /// Run every listener registered for the fault's kind, in order.
    pub fn dispatch(&self, fault: &Fault) {
        let listeners: Vec<FaultListener> = {
            let inner = self.inner.lock().expect("hook registry poisoned");
            inner
                .listeners
                .get(&fault.kind)
                .map(|l| l.iter().map(|r| r.listener.clone()).collect())
                .unwrap_or_default()
        };
        for listener in listeners {
            listener(fault);
        }
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Options for [`ExceptionCaptureManager::catch_all`].
#[derive(Debug, Clone)]
pub struct CatchOptions {
    /// Enable or disable error capture.
    pub errors: bool,
}

impl Default for CatchOptions {
    fn default() -> Self {
        Self { errors: true }
    }
}

/// What the agent's listeners do with a fault: report, then apply the
/// fatal-fault exit policy.
#[derive(Clone)]
struct FaultHandler {
    registry: Arc<HookRegistry>,
    transport: Arc<dyn Transport>,
    exit: Arc<dyn Fn(i32) + Send + Sync>,
}

impl FaultHandler {
    fn handle(&self, fault: &Fault) {
        // Stack representation when the fault carries one, raw value
        // otherwise.
        let diagnostic = match &fault.error {
            Some(ErrorLike::Exception(err)) => err
                .stack
                .clone()
                .or_else(|| err.message.clone())
                .unwrap_or_else(|| format!("<{} without detail>", fault.kind)),
            Some(ErrorLike::Message(message)) => message.clone(),
            Some(ErrorLike::Value(value)) => value.to_string(),
            None => format!("<{} without a value>", fault.kind),
        };

        let error = fault.error.clone().map(rename_length_field);

        if fault.kind == FaultKind::UnhandledRejection {
            info!(
                "An asynchronous failure was not handled, you may have forgotten to join or await a task:"
            );
        }

        error!("{}", diagnostic);

        let data = match &error {
            Some(err) => normalize(err),
            None => serde_json::json!({
                "message": format!("No error but {} was caught!", fault.kind),
            }),
        };
        self.transport.send(Envelope::exception(data));

        // Fail fast: a fatal fault nothing else will handle must not be
        // silently swallowed. The send above has been issued; delivery is
        // not awaited. Termination is final; no agent logic runs past it.
        if fault.kind == FaultKind::UncaughtPanic
            && self.registry.foreign_listener_count(FaultKind::UncaughtPanic) == 0
        {
            (self.exit)(1);
        }
    }
}

struct CaptureState {
    installed: bool,
    previous_hook: Option<Box<dyn Fn(&std::panic::PanicHookInfo<'_>) + Send + Sync>>,
}

/// Owns the lifecycle of the agent's global fault hooks.
///
/// Install and removal are idempotent and run under one lock, so concurrent
/// initialization cannot double-install. Disabling capture removes ALL
/// listeners for both fault kinds, foreign ones included. Deliberately
/// broad, matching long-standing agent behavior.
pub struct ExceptionCaptureManager {
    registry: Arc<HookRegistry>,
    transport: Arc<dyn Transport>,
    modules: Arc<ModuleRegistry>,
    exec_mode: ExecMode,
    capture_context: bool,
    bridge_process_hook: bool,
    exit: Arc<dyn Fn(i32) + Send + Sync>,
    state: Mutex<CaptureState>,
}

impl ExceptionCaptureManager {
    /// Create a manager. Hooks are not installed until `catch_all`.
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
            capture_context: false,
            bridge_process_hook: true,
            exit: Arc::new(|code| std::process::exit(code)),
            state: Mutex::new(CaptureState {
                installed: false,
                previous_hook: None,
            }),
        }
    }

    /// Capture introspection context alongside each panic report.
    pub fn with_capture_context(mut self) -> Self {
        self.capture_context = true;
        self
    }

    /// Replace the terminal exit action. Tests install a recorder.
    pub fn with_exit_action(mut self, exit: impl Fn(i32) + Send + Sync + 'static) -> Self {
        self.exit = Arc::new(exit);
        self
    }

    /// Skip bridging the real process panic hook. Tests drive the registry
    /// directly so the global hook is never touched.
    pub fn without_process_hook(mut self) -> Self {
        self.bridge_process_hook = false;
        self
    }

    /// Enable or disable global fault capture.
    ///
    /// Returns whether agent capture is active after the call. Under cluster
    /// supervision this is a no-op returning `false`; the supervisor owns
    /// restarts. Installation only happens when no listener is currently
    /// registered for the panic kind; removal takes every listener for both
    /// kinds with it (see the type-level note).
    pub fn catch_all(&self, opts: CatchOptions) -> bool {
        self.modules.configure_module(&[("error", opts.errors)]);

        if self.exec_mode == ExecMode::Cluster {
            return false;
        }

        // Critical section: listener inspection and install/remove must be
        // atomic so concurrent initialization stays idempotent.
        let mut state = self.state.lock().expect("capture state poisoned");

        if opts.errors && self.registry.listener_count(FaultKind::UncaughtPanic) == 0 {
            let handler = FaultHandler {
                registry: self.registry.clone(),
                transport: self.transport.clone(),
                exit: self.exit.clone(),
            };
            for kind in [FaultKind::UncaughtPanic, FaultKind::UnhandledRejection] {
                let handler = handler.clone();
                self.registry
                    .register(kind, true, Arc::new(move |fault| handler.handle(fault)));
            }

            if self.bridge_process_hook {
                state.previous_hook = Some(std::panic::take_hook());
                let registry = self.registry.clone();
                let capture_context = self.capture_context;
                std::panic::set_hook(Box::new(move |info| {
                    let fault = Fault {
                        kind: FaultKind::UncaughtPanic,
                        error: Some(ErrorLike::Exception(captured_from_panic(
                            info,
                            capture_context,
                        ))),
                    };
                    registry.dispatch(&fault);
                }));
            }

            state.installed = true;
        } else if !opts.errors && self.registry.listener_count(FaultKind::UncaughtPanic) != 0 {
            self.registry.remove_all(FaultKind::UncaughtPanic);
            self.registry.remove_all(FaultKind::UnhandledRejection);

            if let Some(previous) = state.previous_hook.take() {
                std::panic::set_hook(previous);
            }

            state.installed = false;
        }

        state.installed
    }

    /// Report an unhandled asynchronous failure through the installed hooks.
    pub fn report_rejection(&self, error: impl Into<ErrorLike>) {
        self.registry.dispatch(&Fault {
            kind: FaultKind::UnhandledRejection,
            error: Some(error.into()),
        });
    }
}

/// Rename a `length` field so it cannot collide with serialization
/// assumptions downstream. Compatibility quirk.
fn rename_length_field(mut error: ErrorLike) -> ErrorLike {
    if let ErrorLike::Exception(err) = &mut error {
        if let Some(value) = err.extra.remove("length") {
            err.extra.insert("_length".to_string(), value);
        }
    }
    error
}

fn captured_from_panic(info: &std::panic::PanicHookInfo<'_>, capture_context: bool) -> CapturedError {
    let message = if let Some(s) = info.payload().downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    };

    let mut captured = CapturedError::new(message)
        .with_stack(std::backtrace::Backtrace::force_capture().to_string());

    if let Some(location) = info.location() {
        captured = captured.with_field("location", Value::from(location.to_string()));
    }

    if capture_context {
        let thread = std::thread::current();
        captured = captured.with_field(
            "context",
            serde_json::json!({
                "thread": thread.name().unwrap_or("unnamed"),
            }),
        );
    }

    captured
}
