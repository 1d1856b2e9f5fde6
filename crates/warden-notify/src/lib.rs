//! # Warden Notify
//!
//! Error capture and notification: global fault hooks, normalization of
//! heterogeneous error values, severity filtering and relay to the
//! transport. The feature facade negotiates between the in-process capture
//! manager and the enhanced inspector delegate at `init`.

mod catcher;
mod feature;
mod inspector;
mod middleware;
mod normalize;
mod severity;

pub use catcher::{
    CatchOptions, ExceptionCaptureManager, Fault, FaultKind, FaultListener, HookRegistry,
};
pub use feature::{NotifyFeature, NotifyHandle, NotifyOptions, NotifyOutcome};
pub use inspector::InspectorNotify;
pub use middleware::{
    report_errors, ErrorReporter, ReportedError, RequestMeta, RequestParams, SessionData,
};
pub use normalize::normalize;
pub use severity::Severity;
