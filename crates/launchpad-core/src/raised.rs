use std::backtrace::BacktraceStatus;
use std::fmt::Write as _;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::error::OperationalError;

/// SQLSTATE and errno codes recognized from database drivers
pub mod sqlstate {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    pub const NOT_NULL_VIOLATION: &str = "23502";
    pub const INVALID_PASSWORD: &str = "28P01";
    pub const CONNECTION_REFUSED: &str = "ECONNREFUSED";
}

/// Any error a handler or middleware can raise
///
/// Each variant is built where the corresponding collaborator is called,
/// so classification never has to probe loosely-typed error values.
#[derive(Debug, Error)]
pub enum RaisedError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    MalformedId(#[from] MalformedIdError),

    #[error(transparent)]
    Operational(#[from] OperationalError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl RaisedError {
    /// Short name of the collaborator that raised this error
    pub const fn source_name(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::Token(_) => "token",
            Self::Upload(_) => "upload",
            Self::Schema(_) => "schema",
            Self::MalformedId(_) => "identifier",
            Self::Operational(_) => "operational",
            Self::Internal(_) => "internal",
        }
    }

    /// Structured description of the raw error, for debug responses and logs
    pub fn details(&self) -> Value {
        let error = match self {
            Self::Database(e) => serde_json::to_value(e),
            Self::Token(e) => serde_json::to_value(e),
            Self::Upload(e) => serde_json::to_value(e),
            Self::Schema(e) => serde_json::to_value(e),
            Self::MalformedId(e) => serde_json::to_value(e),
            Self::Operational(e) => Ok(json!({
                "message": e.message,
                "status": e.http_status.as_u16(),
                "code": e.code,
                "fields": e.fields,
                "is_operational": e.is_operational,
            })),
            Self::Internal(e) => Ok(json!({
                "message": e.to_string(),
                "chain": e.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>(),
            })),
        };

        json!({
            "source": self.source_name(),
            "error": error.unwrap_or(Value::Null),
        })
    }

    /// Error message followed by its `caused by` chain and, when one was
    /// captured, the backtrace
    pub fn stack(&self) -> String {
        let mut out = self.to_string();

        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            let _ = write!(out, "\n    caused by: {cause}");
            source = cause.source();
        }

        if let Self::Internal(e) = self
            && e.backtrace().status() == BacktraceStatus::Captured
        {
            let _ = write!(out, "\n{}", e.backtrace());
        }

        out
    }
}

/// Failure reported by the relational database driver
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatabaseError {
    /// A uniqueness constraint rejected the write
    #[error("unique constraint violated")]
    UniqueViolation { detail: Option<String> },

    /// A foreign key pointed at a row that does not exist
    #[error("foreign key constraint violated")]
    ForeignKeyViolation { detail: Option<String> },

    /// A required column was null
    #[error("not-null constraint violated")]
    NotNullViolation { column: Option<String> },

    /// The server rejected the configured credentials
    #[error("database authentication failed")]
    AuthenticationFailed,

    /// Nothing is listening at the database address
    #[error("database connection refused")]
    ConnectionRefused,

    /// Any other driver error
    #[error("database error {code}: {message}")]
    Other { code: String, message: String },
}

impl DatabaseError {
    /// Map a driver code plus its optional detail and column to a variant
    pub fn from_driver(code: &str, message: &str, detail: Option<&str>, column: Option<&str>) -> Self {
        match code {
            sqlstate::UNIQUE_VIOLATION => Self::UniqueViolation {
                detail: detail.map(ToOwned::to_owned),
            },
            sqlstate::FOREIGN_KEY_VIOLATION => Self::ForeignKeyViolation {
                detail: detail.map(ToOwned::to_owned),
            },
            sqlstate::NOT_NULL_VIOLATION => Self::NotNullViolation {
                column: column.map(ToOwned::to_owned),
            },
            sqlstate::INVALID_PASSWORD => Self::AuthenticationFailed,
            sqlstate::CONNECTION_REFUSED => Self::ConnectionRefused,
            other => Self::Other {
                code: other.to_owned(),
                message: message.to_owned(),
            },
        }
    }

    /// Driver code this variant corresponds to
    pub fn code(&self) -> &str {
        match self {
            Self::UniqueViolation { .. } => sqlstate::UNIQUE_VIOLATION,
            Self::ForeignKeyViolation { .. } => sqlstate::FOREIGN_KEY_VIOLATION,
            Self::NotNullViolation { .. } => sqlstate::NOT_NULL_VIOLATION,
            Self::AuthenticationFailed => sqlstate::INVALID_PASSWORD,
            Self::ConnectionRefused => sqlstate::CONNECTION_REFUSED,
            Self::Other { code, .. } => code,
        }
    }
}

/// Failure verifying a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TokenError {
    #[error("malformed token: {reason}")]
    Malformed { reason: String },

    #[error("token expired")]
    Expired,
}

impl From<jwt_compact::ParseError> for TokenError {
    fn from(err: jwt_compact::ParseError) -> Self {
        Self::Malformed { reason: err.to_string() }
    }
}

impl From<jwt_compact::ValidationError> for TokenError {
    fn from(err: jwt_compact::ValidationError) -> Self {
        match err {
            jwt_compact::ValidationError::Expired => Self::Expired,
            other => Self::Malformed {
                reason: other.to_string(),
            },
        }
    }
}

/// Failure while receiving a multipart upload
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UploadError {
    #[error("file exceeds the {limit} byte limit")]
    FileTooLarge { limit: u64 },

    #[error("more than {limit} files in one upload")]
    TooManyFiles { limit: usize },

    #[error("upload failed: {message}")]
    Other { message: String },
}

/// Request body failed schema validation
///
/// Field order is preserved so responses list problems in the order the
/// validator found them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize)]
#[error("validation failed for {} field(s)", .fields.len())]
pub struct SchemaError {
    pub fields: IndexMap<String, String>,
}

impl SchemaError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem with `field`; a later message for the same field replaces the earlier one
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.insert(field.into(), message.into());
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.add(field, message);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Ok(())` when nothing was recorded
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// A path or query identifier that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("malformed identifier `{value}`")]
pub struct MalformedIdError {
    pub value: String,
}

impl MalformedIdError {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }
}
