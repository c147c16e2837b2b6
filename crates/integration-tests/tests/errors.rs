mod harness;

use std::sync::{Arc, Mutex};

use harness::config::ConfigBuilder;
use harness::server::TestServer;
use launchpad_core::{ErrorCode, OperationalError, RaisedError};
use launchpad_server::ErrorReporter;
use serde_json::{Value, json};

#[derive(Default)]
struct CollectingReporter {
    seen: Mutex<Vec<(&'static str, Option<ErrorCode>, u16)>>,
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, raised: &RaisedError, classified: &OperationalError) {
        self.seen
            .lock()
            .unwrap()
            .push((raised.source_name(), classified.code, classified.http_status.as_u16()));
    }
}

#[tokio::test]
async fn unknown_route_envelope() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();

    let resp = server.client().get(server.url("/api/bogus")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
    assert_eq!(
        resp.headers().get("content-type").and_then(|v| v.to_str().ok()),
        Some("application/json")
    );

    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": {
                "message": "Route /api/bogus not found",
                "code": "NOT_FOUND_ERROR",
                "status": "fail",
            },
        })
    );
}

#[tokio::test]
async fn unsupported_method_is_not_found() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();

    let resp = server.client().patch(server.url("/api/uploads")).send().await.unwrap();
    assert_eq!(resp.status(), 404);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["message"], "Route /api/uploads not found");
}

#[tokio::test]
async fn every_error_reaches_the_reporter() {
    let reporter = Arc::new(CollectingReporter::default());
    let server = TestServer::start_with_reporter(ConfigBuilder::new().build(), reporter.clone())
        .await
        .unwrap();

    server.client().get(server.url("/api/bogus")).send().await.unwrap();
    server
        .client()
        .get(server.url("/api/webhooks/not-a-uuid"))
        .send()
        .await
        .unwrap();
    server.client().get(server.url("/health")).send().await.unwrap();

    assert_eq!(
        *reporter.seen.lock().unwrap(),
        vec![
            ("operational", Some(ErrorCode::NotFoundError), 404),
            ("identifier", Some(ErrorCode::ValidationError), 400),
        ]
    );
}

#[tokio::test]
async fn production_omits_debug_detail() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();

    let body: Value = server
        .client()
        .get(server.url("/api/webhooks/42"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["error"]["message"], "Invalid ID format");
    assert!(body["error"].get("stack").is_none());
    assert!(body["error"].get("details").is_none());
}

#[tokio::test]
async fn development_includes_debug_detail() {
    let server = TestServer::start(ConfigBuilder::new().development().build())
        .await
        .unwrap();

    let body: Value = server
        .client()
        .get(server.url("/api/webhooks/42"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["error"]["message"], "Invalid ID format");
    assert_eq!(body["error"]["stack"], "malformed identifier `42`");
    assert_eq!(body["error"]["details"], json!({ "source": "identifier", "error": { "value": "42" } }));
}
