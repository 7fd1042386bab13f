//! Single-page extraction endpoint for trying the model on pasted text.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use packslip_models::ExtractionRecord;
use packslip_utils::{validate_model, PackslipError, PackslipResult};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct TestAiRequest {
    #[serde(default)]
    #[validate(
        required(message = "No text provided"),
        length(min = 1, message = "No text provided")
    )]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TestAiResponse {
    pub result: ExtractionRecord,
}

/// POST /test-ai
pub async fn test_ai(
    State(state): State<AppState>,
    payload: Result<Json<TestAiRequest>, JsonRejection>,
) -> PackslipResult<Json<TestAiResponse>> {
    let Json(request) = payload
        .map_err(|e| PackslipError::validation("body", format!("Test error: {}", e.body_text())))?;
    validate_model(&request)?;

    let text = request.text.unwrap_or_default();
    let result = state.extractor.extract_page(&text).await;

    Ok(Json(TestAiResponse { result }))
}
