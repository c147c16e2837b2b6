use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;

/// `{"success": true, "data": ...}` with a 200
pub struct Success<T>(pub T);

/// Same envelope as [`Success`] with a 201
pub struct Created<T>(pub T);

#[derive(Serialize)]
struct Envelope<'a, T> {
    success: bool,
    data: &'a T,
}

fn envelope<T: Serialize>(status: StatusCode, data: &T) -> Response {
    (status, Json(Envelope { success: true, data })).into_response()
}

impl<T: Serialize> IntoResponse for Success<T> {
    fn into_response(self) -> Response {
        envelope(StatusCode::OK, &self.0)
    }
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        envelope(StatusCode::CREATED, &self.0)
    }
}
