//! Structured error types shared by the stores and the HTTP layer
//!
//! The store layer raises these directly; handlers return them and axum maps
//! each to a status plus a JSON body whose `message` field the client shows
//! verbatim.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured error response for API clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message (the field the client surfaces)
    pub message: String,
}

/// Application error types with proper categorization
#[derive(Debug)]
pub enum AppError {
    // Validation Errors (400)
    InvalidInput { field: String, reason: String },
    MissingField(String),

    // Not Found Errors (404)
    EntryNotFound(String),
    FileNotFound(String),

    // Payload Errors (413)
    FileTooLarge { size: u64, max: u64 },

    // Internal Errors (500)
    StorageError(String),

    // Generic wrapper for external errors
    Internal(anyhow::Error),
}

impl AppError {
    /// Get error code for client identification
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::FileNotFound(_) => "FILE_NOT_FOUND",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::StorageError(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput { .. } | Self::MissingField(_) => StatusCode::BAD_REQUEST,

            Self::EntryNotFound(_) | Self::FileNotFound(_) => StatusCode::NOT_FOUND,

            Self::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,

            Self::StorageError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get detailed error message
    pub fn message(&self) -> String {
        match self {
            Self::InvalidInput { field, reason } => {
                format!("Invalid input for field '{field}': {reason}")
            }
            Self::MissingField(field) => format!("Missing required field '{field}'"),
            Self::EntryNotFound(id) => format!("No text entry with id {id}"),
            Self::FileNotFound(name) => format!("No stored file named '{name}'"),
            Self::FileTooLarge { size, max } => {
                format!("File too large: {size} bytes (max: {max} bytes)")
            }
            Self::StorageError(msg) => format!("Storage error: {msg}"),
            Self::Internal(err) => format!("Internal error: {err}"),
        }
    }

    /// Convert to structured error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.code().to_string(),
            message: self.message(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

/// Convert from anyhow::Error to AppError
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

/// Axum IntoResponse implementation for proper HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Client errors are the caller's problem; server errors are ours.
        if status.is_server_error() {
            tracing::error!("{}", self.message());
        }
        let body = self.to_response();

        (status, Json(body)).into_response()
    }
}

/// Helper trait to convert validation errors
pub trait ValidationErrorExt<T> {
    fn map_validation_err(self, field: &str) -> Result<T>;
}

impl<T> ValidationErrorExt<T> for anyhow::Result<T> {
    fn map_validation_err(self, field: &str) -> Result<T> {
        self.map_err(|e| AppError::InvalidInput {
            field: field.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::MissingField("text".to_string()).code(),
            "MISSING_FIELD"
        );
        assert_eq!(
            AppError::EntryNotFound("1700000000000".to_string()).code(),
            "ENTRY_NOT_FOUND"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::InvalidInput {
                field: "text".to_string(),
                reason: "blank".to_string(),
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::FileNotFound("report.pdf".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::FileTooLarge { size: 11, max: 10 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::StorageError("failed".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_response_serialization() {
        let err = AppError::FileNotFound("notes.txt".to_string());
        let response = err.to_response();

        assert_eq!(response.code, "FILE_NOT_FOUND");
        assert!(response.message.contains("notes.txt"));
    }

    #[test]
    fn test_message_carries_sizes() {
        let err = AppError::FileTooLarge {
            size: 2048,
            max: 1024,
        };
        let msg = err.message();
        assert!(msg.contains("2048"));
        assert!(msg.contains("1024"));
    }
}
