use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers::*, AppState};

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/test", get(test_endpoint))
        .route("/health", get(health_check))
        .route("/upload", post(upload_pdf))
        .route("/test-ai", post(test_ai))
}
