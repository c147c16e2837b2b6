use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use launchpad_core::RaisedError;

use crate::responder::ErrorResponder;

/// Error returned by handlers and middleware
///
/// Rendering is deferred to [`error_layer`], so everything that can fail
/// only has to produce a [`RaisedError`].
#[derive(Debug)]
pub struct ApiError(RaisedError);

impl ApiError {
    pub const fn raised(&self) -> &RaisedError {
        &self.0
    }
}

impl<E> From<E> for ApiError
where
    E: Into<RaisedError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Carries the raised error from the response back up to [`error_layer`]
#[derive(Clone)]
struct Raised(Arc<RaisedError>);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(Raised(Arc::new(self.0)));
        response
    }
}

/// Render any raised error returned by inner layers or handlers
///
/// Headers set further in (CORS, `retry-after`) are kept on the rendered
/// response; the body headers are replaced.
pub async fn error_layer(responder: Arc<ErrorResponder>, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let Some(Raised(raised)) = response.extensions_mut().remove::<Raised>() else {
        return response;
    };

    let mut rendered = responder.respond(&raised);
    for (name, value) in response.headers() {
        if name != CONTENT_TYPE && name != CONTENT_LENGTH {
            rendered.headers_mut().append(name.clone(), value.clone());
        }
    }

    rendered
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::routing::get;
    use launchpad_config::Environment;
    use launchpad_core::{ErrorCode, OperationalError};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::responder::tests::RecordingReporter;

    fn app(reporter: Arc<RecordingReporter>) -> Router {
        let responder = Arc::new(ErrorResponder::new(Environment::Production, reporter));

        Router::new()
            .route(
                "/boom",
                get(|| async { Err::<(), ApiError>(anyhow::anyhow!("worker channel closed").into()) }),
            )
            .route(
                "/teapot",
                get(|| async {
                    let mut response =
                        ApiError::from(OperationalError::with_status(StatusCode::IM_A_TEAPOT, "short and stout"))
                            .into_response();
                    response.headers_mut().insert("x-brew", "earl-grey".parse().unwrap());
                    response
                }),
            )
            .route("/fine", get(|| async { "fine" }))
            .layer(axum::middleware::from_fn(move |req, next| {
                let responder = Arc::clone(&responder);
                async move { error_layer(responder, req, next).await }
            }))
    }

    async fn call(app: Router, path: &str) -> (StatusCode, http::HeaderMap, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, bytes.to_vec())
    }

    #[tokio::test]
    async fn internal_error_is_opaque() {
        let reporter = Arc::new(RecordingReporter::default());
        let (status, _, body) = call(app(reporter.clone()), "/boom").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "INTERNAL_SERVER_ERROR");
        assert_eq!(body["error"]["message"], "Something went wrong");
        assert_eq!(body["error"]["status"], "error");
        assert!(body["error"].get("stack").is_none());

        assert_eq!(
            *reporter.reports.lock().unwrap(),
            vec![("internal".to_owned(), Some(ErrorCode::InternalServerError))]
        );
    }

    #[tokio::test]
    async fn inner_headers_survive_rendering() {
        let (status, headers, body) = call(app(Arc::default()), "/teapot").await;

        assert_eq!(status, StatusCode::IM_A_TEAPOT);
        assert_eq!(headers["x-brew"], "earl-grey");
        assert_eq!(headers[CONTENT_TYPE], "application/json");

        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["message"], "short and stout");
        assert_eq!(body["error"]["code"], Value::Null);
    }

    #[tokio::test]
    async fn successful_responses_pass_through() {
        let reporter = Arc::new(RecordingReporter::default());
        let (status, _, body) = call(app(reporter.clone()), "/fine").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"fine");
        assert!(reporter.reports.lock().unwrap().is_empty());
    }
}
