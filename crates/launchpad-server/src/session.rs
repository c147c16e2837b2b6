use axum::Extension;
use launchpad_auth::Session;
use launchpad_core::OperationalError;

use crate::error::ApiError;
use crate::reply::Success;

/// Echo the verified bearer token's claims
pub async fn current_session(session: Option<Extension<Session>>) -> Result<Success<Session>, ApiError> {
    let Some(Extension(session)) = session else {
        return Err(OperationalError::authentication("Authentication required").into());
    };

    Ok(Success(session))
}
