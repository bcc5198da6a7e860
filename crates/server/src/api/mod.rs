pub mod handlers;
pub mod policies;
pub mod profiles;
pub mod releases;
pub mod routes;
pub mod wanted;

pub use routes::create_router;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use grabbit_core::StoreError;

/// Common error payload for every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub(crate) fn store_error(e: StoreError) -> ApiError {
    match e {
        StoreError::NotFound(what) => error(StatusCode::NOT_FOUND, what),
        other => error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}
