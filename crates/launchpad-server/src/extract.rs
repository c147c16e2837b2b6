use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use http::request::Parts;
use launchpad_core::{MalformedIdError, SchemaError};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::ApiError;

/// Request bodies that check themselves after deserialization
pub trait Validate {
    /// # Errors
    ///
    /// Returns every failing field with its message
    fn validate(&self) -> Result<(), SchemaError>;
}

/// JSON body that deserialized and passed [`Validate`]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(json_rejection)?;
        value.validate()?;
        Ok(Self(value))
    }
}

fn json_rejection(rejection: JsonRejection) -> SchemaError {
    let field = match &rejection {
        JsonRejection::MissingJsonContentType(_) => "content-type",
        _ => "body",
    };

    SchemaError::new().with(field, rejection.body_text())
}

/// UUID path parameter
///
/// Anything that is not a UUID is a malformed identifier rather than an
/// unknown route.
pub struct Id(pub Uuid);

impl<S> FromRequestParts<S> for Id
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| anyhow::Error::new(e).context("route has no identifier segment"))?;

        Uuid::parse_str(&raw)
            .map(Self)
            .map_err(|_| MalformedIdError::new(raw).into())
    }
}
