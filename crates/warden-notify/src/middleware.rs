//! HTTP error-reporting middleware.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use serde_json::Value;

use warden_config::ModuleRegistry;
use warden_protocols::{jsonize, CapturedError, Envelope, Transport};

/// Request parameters an application stashes in request extensions so they
/// appear on error reports.
#[derive(Debug, Clone)]
pub struct RequestParams(pub Value);

/// Session data an application stashes in request extensions so it appears
/// on error reports.
#[derive(Debug, Clone)]
pub struct SessionData(pub Value);

/// Failure a handler attaches to its response to have it reported.
#[derive(Debug, Clone)]
pub struct ReportedError(pub CapturedError);

/// Request metadata attached to reported errors.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub url: String,
    pub method: String,
    pub params: Option<Value>,
    pub session: Option<Value>,
}

/// State handed to [`report_errors`].
#[derive(Clone)]
pub struct ErrorReporter {
    transport: Arc<dyn Transport>,
}

impl ErrorReporter {
    /// Create the middleware state. Enables the `error` module flag.
    pub fn new(transport: Arc<dyn Transport>, modules: &ModuleRegistry) -> Self {
        modules.configure_module(&[("error", true)]);
        Self { transport }
    }
}

/// Middleware reporting handler failures with request metadata attached.
///
/// Mount with `axum::middleware::from_fn_with_state`. A handler flags a
/// failure by inserting [`ReportedError`] into its response extensions; the
/// middleware coerces sub-400 statuses to 500, enriches the error with the
/// request metadata, relays it through the same normalize-and-send path as
/// every other report, and returns the response.
pub async fn report_errors(
    State(reporter): State<ErrorReporter>,
    request: Request,
    next: Next,
) -> Response {
    let meta = RequestMeta {
        url: request.uri().to_string(),
        method: request.method().to_string(),
        params: request
            .extensions()
            .get::<RequestParams>()
            .map(|p| p.0.clone()),
        session: request
            .extensions()
            .get::<SessionData>()
            .map(|s| s.0.clone()),
    };

    let mut response = next.run(request).await;

    if let Some(ReportedError(err)) = response.extensions_mut().remove::<ReportedError>() {
        if response.status().as_u16() < 400 {
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        }
        let enriched = enrich(err, &meta);
        reporter
            .transport
            .send(Envelope::exception(jsonize(&enriched)));
    }

    response
}

fn enrich(mut err: CapturedError, meta: &RequestMeta) -> CapturedError {
    err.extra
        .insert("url".to_string(), Value::from(meta.url.clone()));
    err.extra
        .insert("component".to_string(), Value::from(meta.url.clone()));
    err.extra
        .insert("action".to_string(), Value::from(meta.method.clone()));
    if let Some(params) = &meta.params {
        err.extra.insert("params".to_string(), params.clone());
    }
    if let Some(session) = &meta.session {
        err.extra.insert("session".to_string(), session.clone());
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrich_attaches_request_metadata() {
        let meta = RequestMeta {
            url: "/orders/7".to_string(),
            method: "POST".to_string(),
            params: Some(serde_json::json!({"id": 7})),
            session: Some(serde_json::json!({"user": "ada"})),
        };

        let enriched = enrich(CapturedError::new("boom"), &meta);
        assert_eq!(enriched.extra["url"], "/orders/7");
        assert_eq!(enriched.extra["component"], "/orders/7");
        assert_eq!(enriched.extra["action"], "POST");
        assert_eq!(enriched.extra["params"]["id"], 7);
        assert_eq!(enriched.extra["session"]["user"], "ada");
    }

    #[test]
    fn test_enrich_skips_absent_metadata() {
        let meta = RequestMeta {
            url: "/health".to_string(),
            method: "GET".to_string(),
            params: None,
            session: None,
        };

        let enriched = enrich(CapturedError::new("boom"), &meta);
        assert!(!enriched.extra.contains_key("params"));
        assert!(!enriched.extra.contains_key("session"));
    }

    #[test]
    fn test_error_reporter_enables_error_module() {
        struct NullTransport;
        impl Transport for NullTransport {
            fn send(&self, _envelope: Envelope) {}
        }

        let modules = ModuleRegistry::new();
        let _reporter = ErrorReporter::new(Arc::new(NullTransport), &modules);
        assert!(modules.is_enabled("error"));
    }
}
