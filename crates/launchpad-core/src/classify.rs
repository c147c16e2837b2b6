use crate::error::OperationalError;
use crate::raised::{DatabaseError, RaisedError, TokenError, UploadError};

/// Field name reported when a driver detail names no column
pub const FALLBACK_FIELD: &str = "field";

/// Map a raised error to the one operational error the client will see
///
/// Total and side-effect free: every variant has exactly one outcome, and
/// anything not explicitly recognized becomes [`OperationalError::internal`]
/// so its text never leaves the server.
pub fn classify(error: &RaisedError) -> OperationalError {
    match error {
        RaisedError::Database(db) => classify_database(db),
        RaisedError::Schema(schema) => {
            let fields: Vec<String> = schema.fields.keys().cloned().collect();
            let message = if schema.is_empty() {
                "Validation failed".to_owned()
            } else {
                let problems: Vec<&str> = schema.fields.values().map(String::as_str).collect();
                format!("Validation failed: {}", problems.join(", "))
            };
            OperationalError::validation(message).with_fields(fields)
        }
        RaisedError::MalformedId(_) => OperationalError::validation("Invalid ID format"),
        RaisedError::Token(TokenError::Malformed { .. }) => OperationalError::authentication("Invalid token"),
        RaisedError::Token(TokenError::Expired) => OperationalError::authentication("Token expired"),
        RaisedError::Upload(UploadError::FileTooLarge { .. }) => OperationalError::validation("File too large"),
        RaisedError::Upload(UploadError::TooManyFiles { .. }) => OperationalError::validation("Too many files"),
        RaisedError::Operational(op) if op.is_operational => op.clone(),
        RaisedError::Upload(UploadError::Other { .. }) | RaisedError::Operational(_) | RaisedError::Internal(_) => {
            OperationalError::internal()
        }
    }
}

fn classify_database(error: &DatabaseError) -> OperationalError {
    match error {
        DatabaseError::UniqueViolation { detail } => {
            let field = detail
                .as_deref()
                .and_then(parenthesized)
                .unwrap_or(FALLBACK_FIELD);
            OperationalError::validation(format!("{field} already exists")).with_fields(vec![field.to_owned()])
        }
        DatabaseError::ForeignKeyViolation { .. } => {
            OperationalError::validation("Referenced resource does not exist")
        }
        DatabaseError::NotNullViolation { column } => {
            let column = column
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(FALLBACK_FIELD);
            OperationalError::validation(format!("{column} is required")).with_fields(vec![column.to_owned()])
        }
        DatabaseError::AuthenticationFailed => {
            OperationalError::database("Database authentication failed. Please check your credentials.")
        }
        DatabaseError::ConnectionRefused => {
            OperationalError::database("Database connection refused. Please check if the database is running.")
        }
        DatabaseError::Other { .. } => OperationalError::internal(),
    }
}

/// Text between the first `(` and the following `)`, if non-empty
///
/// Postgres reports duplicates as `Key (email)=(a@b.com) already exists.`;
/// other drivers and versions may not, hence the fallback.
fn parenthesized(detail: &str) -> Option<&str> {
    let start = detail.find('(')? + 1;
    let len = detail[start..].find(')')?;
    let inner = detail[start..start + len].trim();
    (!inner.is_empty()).then_some(inner)
}
