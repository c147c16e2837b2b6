use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use launchpad_auth::{TokenVerifier, bearer_token};
use launchpad_core::OperationalError;

use crate::error::ApiError;

/// Require a valid bearer token outside the public paths
///
/// The verified [`launchpad_auth::Session`] is attached to the request
/// extensions for handlers.
pub async fn auth_middleware(
    verifier: Arc<TokenVerifier>,
    public_paths: Arc<[String]>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if public_paths.iter().any(|p| is_under(path, p)) {
        return next.run(request).await;
    }

    let token = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);

    let Some(token) = token else {
        return ApiError::from(OperationalError::authentication("Authentication required")).into_response();
    };

    match verifier.verify(token) {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "bearer token rejected");
            ApiError::from(e).into_response()
        }
    }
}

/// `path` is `prefix` itself or nested below it
fn is_under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix.trim_end_matches('/'))
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_path_matches_whole_segments() {
        assert!(is_under("/health", "/health"));
        assert!(is_under("/health/live", "/health"));
        assert!(is_under("/docs/api", "/docs/"));

        assert!(!is_under("/healthz", "/health"));
        assert!(!is_under("/health-admin", "/health"));
        assert!(!is_under("/api/health", "/health"));
    }
}
