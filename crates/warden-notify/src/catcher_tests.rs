//! Tests for the hook registry and exception capture manager.

use super::*;

struct RecordingTransport {
    envelopes: Mutex<Vec<Envelope>>,
}

impl RecordingTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            envelopes: Mutex::new(Vec::new()),
        })
    }

    fn envelopes(&self) -> Vec<Envelope> {
        self.envelopes.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, envelope: Envelope) {
        self.envelopes.lock().unwrap().push(envelope);
    }
}

struct Harness {
    manager: Arc<ExceptionCaptureManager>,
    registry: Arc<HookRegistry>,
    transport: Arc<RecordingTransport>,
    modules: Arc<ModuleRegistry>,
    exits: Arc<Mutex<Vec<i32>>>,
}

fn harness(exec_mode: ExecMode) -> Harness {
    let registry = Arc::new(HookRegistry::new());
    let transport = RecordingTransport::new();
    let modules = Arc::new(ModuleRegistry::new());
    let exits = Arc::new(Mutex::new(Vec::new()));

    let recorder = exits.clone();
    let manager = Arc::new(
        ExceptionCaptureManager::new(
            registry.clone(),
            transport.clone(),
            modules.clone(),
            exec_mode,
        )
        .without_process_hook()
        .with_exit_action(move |code| recorder.lock().unwrap().push(code)),
    );

    Harness {
        manager,
        registry,
        transport,
        modules,
        exits,
    }
}

fn panic_fault(message: &str) -> Fault {
    Fault {
        kind: FaultKind::UncaughtPanic,
        error: Some(ErrorLike::from(message)),
    }
}

#[test]
fn test_install_is_idempotent() {
    let h = harness(ExecMode::Standalone);

    assert!(h.manager.catch_all(CatchOptions { errors: true }));
    assert!(h.manager.catch_all(CatchOptions { errors: true }));

    assert_eq!(h.registry.listener_count(FaultKind::UncaughtPanic), 1);
    assert_eq!(h.registry.listener_count(FaultKind::UnhandledRejection), 1);
}

#[test]
fn test_disable_removes_hooks() {
    let h = harness(ExecMode::Standalone);

    h.manager.catch_all(CatchOptions { errors: true });
    assert!(!h.manager.catch_all(CatchOptions { errors: false }));

    assert_eq!(h.registry.listener_count(FaultKind::UncaughtPanic), 0);
    assert_eq!(h.registry.listener_count(FaultKind::UnhandledRejection), 0);
}

#[test]
fn test_disable_removes_foreign_listeners_too() {
    let h = harness(ExecMode::Standalone);

    h.manager.catch_all(CatchOptions { errors: true });
    h.registry
        .register(FaultKind::UncaughtPanic, false, Arc::new(|_| {}));
    assert_eq!(h.registry.listener_count(FaultKind::UncaughtPanic), 2);

    h.manager.catch_all(CatchOptions { errors: false });
    assert_eq!(h.registry.listener_count(FaultKind::UncaughtPanic), 0);
}

#[test]
fn test_install_skipped_when_listeners_exist() {
    let h = harness(ExecMode::Standalone);

    h.registry
        .register(FaultKind::UncaughtPanic, false, Arc::new(|_| {}));
    assert!(!h.manager.catch_all(CatchOptions { errors: true }));

    // Only the pre-existing foreign listener remains.
    assert_eq!(h.registry.listener_count(FaultKind::UncaughtPanic), 1);
    assert_eq!(h.registry.foreign_listener_count(FaultKind::UncaughtPanic), 1);
}

#[test]
fn test_cluster_mode_is_noop() {
    let h = harness(ExecMode::Cluster);

    assert!(!h.manager.catch_all(CatchOptions { errors: true }));
    assert_eq!(h.registry.listener_count(FaultKind::UncaughtPanic), 0);

    // The module flag is still forwarded before the cluster check.
    assert!(h.modules.is_enabled("error"));
}

#[test]
fn test_catch_all_forwards_module_flag() {
    let h = harness(ExecMode::Standalone);

    h.manager.catch_all(CatchOptions { errors: true });
    assert!(h.modules.is_enabled("error"));

    h.manager.catch_all(CatchOptions { errors: false });
    assert!(!h.modules.is_enabled("error"));
}

#[test]
fn test_panic_fault_reports_and_exits() {
    let h = harness(ExecMode::Standalone);
    h.manager.catch_all(CatchOptions { errors: true });

    h.registry.dispatch(&panic_fault("boom"));

    let envelopes = h.transport.envelopes();
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].event_type, "process:exception");
    assert_eq!(envelopes[0].data["message"], "boom");
    assert_eq!(envelopes[0].data["stack"], "boom");

    assert_eq!(*h.exits.lock().unwrap(), vec![1]);
}

#[test]
fn test_panic_fault_with_foreign_listener_does_not_exit() {
    let h = harness(ExecMode::Standalone);
    h.manager.catch_all(CatchOptions { errors: true });
    h.registry
        .register(FaultKind::UncaughtPanic, false, Arc::new(|_| {}));

    h.registry.dispatch(&panic_fault("boom"));

    assert_eq!(h.transport.envelopes().len(), 1);
    assert!(h.exits.lock().unwrap().is_empty());
}

#[test]
fn test_rejection_reports_without_exiting() {
    let h = harness(ExecMode::Standalone);
    h.manager.catch_all(CatchOptions { errors: true });

    h.manager.report_rejection("task failed");

    let envelopes = h.transport.envelopes();
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].data["message"], "task failed");
    assert!(h.exits.lock().unwrap().is_empty());
}

#[test]
fn test_length_field_is_renamed() {
    let h = harness(ExecMode::Standalone);
    h.manager.catch_all(CatchOptions { errors: true });

    let err = CapturedError::new("boom").with_field("length", serde_json::json!(3));
    h.registry.dispatch(&Fault {
        kind: FaultKind::UnhandledRejection,
        error: Some(ErrorLike::Exception(err)),
    });

    let envelopes = h.transport.envelopes();
    assert_eq!(envelopes[0].data["_length"], 3);
    assert!(envelopes[0].data.get("length").is_none());
}

#[test]
fn test_fault_without_value_reports_placeholder() {
    let h = harness(ExecMode::Standalone);
    h.manager.catch_all(CatchOptions { errors: true });

    h.registry.dispatch(&Fault {
        kind: FaultKind::UnhandledRejection,
        error: None,
    });

    let envelopes = h.transport.envelopes();
    assert_eq!(
        envelopes[0].data["message"],
        "No error but unhandled rejection was caught!"
    );
}

#[test]
fn test_exception_fault_preserves_structure() {
    let h = harness(ExecMode::Standalone);
    h.manager.catch_all(CatchOptions { errors: true });
    h.registry
        .register(FaultKind::UncaughtPanic, false, Arc::new(|_| {}));

    let err = CapturedError::new("boom")
        .with_stack("at main\nat start")
        .with_field("code", serde_json::json!(42));
    h.registry.dispatch(&Fault {
        kind: FaultKind::UncaughtPanic,
        error: Some(ErrorLike::Exception(err)),
    });

    let envelopes = h.transport.envelopes();
    assert_eq!(envelopes[0].data["message"], "boom");
    assert_eq!(envelopes[0].data["stack"], "at main\nat start");
    assert_eq!(envelopes[0].data["code"], 42);
}

#[test]
fn test_dispatch_runs_listeners_in_order() {
    let registry = HookRegistry::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    for tag in ["first", "second"] {
        let seen = seen.clone();
        registry.register(
            FaultKind::UncaughtPanic,
            false,
            Arc::new(move |_| seen.lock().unwrap().push(tag)),
        );
    }

    registry.dispatch(&panic_fault("boom"));
    assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
}
