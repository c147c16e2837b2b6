use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::HeaderValue;
use launchpad_core::OperationalError;
use launchpad_ratelimit::{RateLimitError, RequestLimiter};

use crate::error::ApiError;

/// Reject requests over the global or per-client limit
pub async fn rate_limit_middleware(
    limiter: Arc<RequestLimiter>,
    trusted_hops: usize,
    request: Request,
    next: Next,
) -> Response {
    if let Err(e) = limiter.check_global().await {
        return rejection(e);
    }

    if let Some(ip) = client_ip(&request, trusted_hops)
        && let Err(e) = limiter.check_ip(&ip).await
    {
        return rejection(e);
    }

    next.run(request).await
}

/// Client address as seen by the outermost trusted proxy
///
/// With `trusted_hops` proxies in front, each appends its peer to
/// `x-forwarded-for`, so the client is the `trusted_hops`-th entry from the
/// right. Without trusted proxies the forwarding headers are client input and
/// only the peer address counts.
fn client_ip(request: &Request, trusted_hops: usize) -> Option<String> {
    if trusted_hops > 0 {
        if let Some(forwarded) = request.headers().get("x-forwarded-for")
            && let Ok(val) = forwarded.to_str()
        {
            let hops: Vec<&str> = val.split(',').map(str::trim).filter(|h| !h.is_empty()).collect();
            if let Some(client) = hops.get(hops.len().saturating_sub(trusted_hops)) {
                return Some((*client).to_owned());
            }
        }

        if let Some(real_ip) = request.headers().get("x-real-ip")
            && let Ok(val) = real_ip.to_str()
        {
            return Some(val.trim().to_owned());
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}

fn rejection(error: RateLimitError) -> Response {
    match error {
        RateLimitError::Exceeded { retry_after } => {
            let mut response =
                ApiError::from(OperationalError::rate_limited("Too many requests, please try again later"))
                    .into_response();
            response
                .headers_mut()
                .insert(http::header::RETRY_AFTER, HeaderValue::from(retry_after));
            response
        }
        other => ApiError::from(anyhow::Error::new(other).context("rate limiter unavailable")).into_response(),
    }
}
