use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use tracing::error;

use crate::gemini_client::GenerationSettings;
use crate::AppState;

const PROBE_PROMPT: &str = "Hello";

/// Liveness plus a round trip to the AI API.
///
/// The probe bypasses the rate limiter.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let settings = GenerationSettings {
        temperature: state.config.gemini.temperature,
        max_output_tokens: state.config.gemini.single_page_max_tokens,
    };

    match state.ai_client.generate(PROBE_PROMPT, settings).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "ai_connection": "connected",
                "model": state.ai_client.model(),
            })),
        ),
        Err(e) => {
            error!(error = %format!("{:#}", e), "AI health probe failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "unhealthy",
                    "ai_connection": "failed",
                    "error": format!("{:#}", e),
                })),
            )
        }
    }
}
