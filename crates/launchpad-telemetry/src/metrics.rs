//! Metric names and instruments

use opentelemetry::KeyValue;
use opentelemetry::metrics::Counter;

/// Error envelopes written, keyed by `error.code` and `http.response.status_code`
pub const HTTP_ERROR_RESPONSES: &str = "http.server.error_responses";

/// Counter of error responses on the global meter
///
/// Recording is a no-op until a meter provider is installed by [`crate::init`].
pub fn error_responses() -> Counter<u64> {
    opentelemetry::global::meter("launchpad")
        .u64_counter(HTTP_ERROR_RESPONSES)
        .with_description("Error responses returned to clients")
        .build()
}

/// Increment the error counter for one response
pub fn record_error_response(counter: &Counter<u64>, code: &'static str, status: u16) {
    counter.add(
        1,
        &[
            KeyValue::new("error.code", code),
            KeyValue::new("http.response.status_code", i64::from(status)),
        ],
    );
}
