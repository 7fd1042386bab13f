use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use packslip_utils::ErrorResponse;
use std::any::Any;

/// Turn a handler panic into a 500 so the server keeps serving.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "Unknown panic".to_string()
    };

    tracing::error!(%message, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::unhandled(message, "panic")),
    )
        .into_response()
}
