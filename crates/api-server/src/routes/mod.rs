//! Route handlers

pub mod health;
pub mod task;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

/// Error body on the wire: `{"message": ...}`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Map a core error to a status and `{"message"}` body
pub fn error_response(err: taskdeck_core::Error) -> (StatusCode, Json<MessageResponse>) {
    use taskdeck_core::Error;
    let status = match &err {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::TaskNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(MessageResponse {
            message: err.to_string(),
        }),
    )
}

/// Map a request body that failed to deserialize to the same 400
/// `{"message"}` shape as any other validation failure
pub fn rejection_response(rejection: JsonRejection) -> (StatusCode, Json<MessageResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(MessageResponse {
            message: rejection.body_text(),
        }),
    )
}

/// Fallback for unknown routes
pub async fn not_found() -> (StatusCode, Json<MessageResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(MessageResponse {
            message: "Route not found".to_string(),
        }),
    )
}
