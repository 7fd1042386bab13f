use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum PackslipError {
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("No readable text found in PDF")]
    NoReadableText,

    #[error("No valid packing slip data found in PDF")]
    NoValidRecords,

    #[error("Error processing PDF: {message}")]
    PdfProcessing { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl PackslipError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn pdf_processing(message: impl Into<String>) -> Self {
        Self::PdfProcessing {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NoReadableText => "NO_READABLE_TEXT",
            Self::NoValidRecords => "NO_VALID_RECORDS",
            Self::PdfProcessing { .. } => "PDF_PROCESSING_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::NoReadableText => 400,
            Self::NoValidRecords => 400,
            Self::PdfProcessing { .. } => 500,
            Self::Configuration { .. } => 500,
            Self::Internal { .. } => 500,
        }
    }
}

pub type PackslipResult<T> = Result<T, PackslipError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl ErrorResponse {
    /// Body for failures that escaped every handler, such as a panic.
    pub fn unhandled(message: impl Into<String>, error_type: impl Into<String>) -> Self {
        Self {
            error: "Internal server error".to_string(),
            code: "INTERNAL_SERVER_ERROR".to_string(),
            message: message.into(),
            error_type: Some(error_type.into()),
        }
    }
}

impl From<&PackslipError> for ErrorResponse {
    fn from(error: &PackslipError) -> Self {
        Self {
            error: error.to_string(),
            code: error.error_code().to_string(),
            message: error.to_string(),
            error_type: None,
        }
    }
}

impl IntoResponse for PackslipError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self);
        } else {
            tracing::warn!(code = self.error_code(), "{}", self);
        }

        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

impl From<csv::Error> for PackslipError {
    fn from(error: csv::Error) -> Self {
        Self::internal(format!("CSV export failed: {}", error))
    }
}

impl From<config::ConfigError> for PackslipError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}
