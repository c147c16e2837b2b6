use std::sync::Arc;

use axum::Json;
use axum::response::{IntoResponse, Response};
use launchpad_config::Environment;
use launchpad_core::{ErrorCode, OperationalError, RaisedError, classify};
use opentelemetry::metrics::Counter;
use serde::Serialize;
use serde_json::Value;

/// Receives every raised error before its response is written
///
/// Implementations must not block; the response waits on them.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, raised: &RaisedError, classified: &OperationalError);
}

/// Reports through `tracing` and the error response counter
pub struct TracingReporter {
    counter: Counter<u64>,
}

impl TracingReporter {
    pub fn new() -> Self {
        Self {
            counter: launchpad_telemetry::metrics::error_responses(),
        }
    }
}

impl Default for TracingReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorReporter for TracingReporter {
    fn report(&self, raised: &RaisedError, classified: &OperationalError) {
        let code = classified.code.map_or("NONE", ErrorCode::as_str);
        let status = classified.http_status.as_u16();

        launchpad_telemetry::metrics::record_error_response(&self.counter, code, status);

        if classified.http_status.is_server_error() {
            tracing::error!(
                error.source = raised.source_name(),
                error.code = code,
                http.status = status,
                error.stack = %raised.stack(),
                "request failed: {raised}"
            );
        } else {
            tracing::warn!(
                error.source = raised.source_name(),
                error.code = code,
                http.status = status,
                "request rejected: {}",
                classified.message
            );
        }
    }
}

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: Option<ErrorCode>,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Turns raised errors into JSON error responses
///
/// Debug detail (`stack` and `details`) is only attached in development.
#[derive(Clone)]
pub struct ErrorResponder {
    environment: Environment,
    reporter: Arc<dyn ErrorReporter>,
}

impl ErrorResponder {
    pub fn new(environment: Environment, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self { environment, reporter }
    }

    /// Classify, report and render one error
    pub fn respond(&self, raised: &RaisedError) -> Response {
        let classified = classify(raised);
        self.reporter.report(raised, &classified);

        let status = classified.http_status;
        (status, Json(self.envelope(raised, classified))).into_response()
    }

    pub fn envelope(&self, raised: &RaisedError, classified: OperationalError) -> ErrorEnvelope {
        let debug = self.environment.is_development();

        ErrorEnvelope {
            success: false,
            error: ErrorBody {
                status: classified.status_label(),
                message: classified.message,
                code: classified.code,
                fields: classified.fields,
                stack: debug.then(|| raised.stack()),
                details: debug.then(|| raised.details()),
            },
        }
    }
}
