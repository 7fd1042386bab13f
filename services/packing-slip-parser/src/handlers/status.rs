use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Packing Slip Parser API",
        "status": "running",
        "endpoints": ["/health", "/upload", "/test-ai"],
    }))
}

pub async fn test_endpoint(State(state): State<AppState>) -> Json<Value> {
    let timestamp = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;

    Json(json!({
        "status": "API is working!",
        "gemini_key_exists": !state.config.gemini.api_key.trim().is_empty(),
        "timestamp": timestamp,
    }))
}
