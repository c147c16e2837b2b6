use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Machine-readable error codes exposed to API consumers
///
/// The set is closed: every response body carries one of these (or
/// `null` for ad hoc operational errors built without a code).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumIter, strum::IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    AuthenticationError,
    AuthorizationError,
    NotFoundError,
    RateLimitError,
    DatabaseError,
    InternalServerError,
}

impl ErrorCode {
    /// HTTP status paired with this code
    pub const fn status(self) -> StatusCode {
        match self {
            Self::ValidationError => StatusCode::BAD_REQUEST,
            Self::AuthenticationError => StatusCode::UNAUTHORIZED,
            Self::AuthorizationError => StatusCode::FORBIDDEN,
            Self::NotFoundError => StatusCode::NOT_FOUND,
            Self::RateLimitError => StatusCode::TOO_MANY_REQUESTS,
            Self::DatabaseError | Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A normalized, client-facing error
///
/// Only errors with `is_operational` set are reflected verbatim; anything
/// else is replaced by [`OperationalError::internal`] during classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct OperationalError {
    pub message: String,
    pub http_status: StatusCode,
    pub code: Option<ErrorCode>,
    pub fields: Option<Vec<String>>,
    pub is_operational: bool,
}

impl OperationalError {
    /// Message used whenever the real cause must stay server-side
    pub const GENERIC_MESSAGE: &'static str = "Something went wrong";

    /// Build an operational error whose status follows from `code`
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            http_status: code.status(),
            code: Some(code),
            fields: None,
            is_operational: true,
        }
    }

    /// Build an operational error with an explicit status and no code
    pub fn with_status(http_status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            http_status,
            code: None,
            fields: None,
            is_operational: true,
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Mark this error as a programming defect rather than an anticipated failure
    #[must_use]
    pub const fn non_operational(mut self) -> Self {
        self.is_operational = false;
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthenticationError, message)
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthorizationError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFoundError, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RateLimitError, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// The opaque error every unrecognized failure collapses into
    pub fn internal() -> Self {
        Self::new(ErrorCode::InternalServerError, Self::GENERIC_MESSAGE)
    }

    /// 404 for a method and path no route handles
    pub fn route_not_found(path: &str) -> Self {
        Self::not_found(format!("Route {path} not found"))
    }

    /// `"fail"` for 4xx statuses, `"error"` for everything else
    pub fn status_label(&self) -> &'static str {
        if self.http_status.is_client_error() { "fail" } else { "error" }
    }
}
