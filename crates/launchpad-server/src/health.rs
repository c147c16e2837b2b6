use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    status: &'static str,
    database: &'static str,
}

/// Liveness probe, with a `SELECT 1` round trip when a database is configured
///
/// A failing database surfaces through the error pipeline like any other
/// driver error.
pub async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthStatus>, ApiError> {
    let database = match state.database {
        Some(ref db) if state.check_database => {
            db.ping().await?;
            "up"
        }
        Some(_) => "unchecked",
        None => "disabled",
    };

    Ok(Json(HealthStatus { status: "ok", database }))
}
