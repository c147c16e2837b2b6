use http::Uri;
use launchpad_core::OperationalError;

use crate::error::ApiError;

/// Fallback for unknown paths and for known paths hit with an unsupported method
pub async fn route_not_found(uri: Uri) -> ApiError {
    let target = uri.path_and_query().map_or_else(|| uri.path(), |pq| pq.as_str());
    OperationalError::route_not_found(target).into()
}
