//! Packing Slip Upload Handler
//!
//! Accepts a PDF of packing slips and answers with the shipment CSV.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use packslip_utils::{validate_pdf_filename, PackslipError, PackslipResult, CSV_FILENAME};
use tracing::info;

use crate::AppState;

const FILE_FIELD: &str = "file";

/// Upload a packing slip PDF
///
/// POST /upload
pub async fn upload_pdf(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> PackslipResult<Response> {
    let mut multipart = multipart.map_err(|_| PackslipError::validation(FILE_FIELD, "No file provided"))?;

    let field = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| PackslipError::validation(FILE_FIELD, format!("Failed to read upload: {}", e)))?
            .ok_or_else(|| PackslipError::validation(FILE_FIELD, "No file provided"))?;

        if field.name() == Some(FILE_FIELD) {
            break field;
        }
    };

    // A `file` part without a filename is a plain form value, not an upload
    let filename = field
        .file_name()
        .map(str::to_string)
        .ok_or_else(|| PackslipError::validation(FILE_FIELD, "No file provided"))?;
    validate_pdf_filename(Some(&filename))?;

    let data = field
        .bytes()
        .await
        .map_err(|e| PackslipError::validation(FILE_FIELD, format!("Failed to read file data: {}", e)))?;

    info!(filename = %filename, size = data.len(), "Processing uploaded PDF");

    let csv = state.orchestrator.process_pdf(data.to_vec()).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", CSV_FILENAME),
            ),
        ],
        csv,
    )
        .into_response())
}
