//! Error types and handling
//!
//! Common error type returned by the command layer.

use crate::recorder::error::RecordingError;
use crate::recordings::blob::BlobError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Shown to the user as-is
    #[error(transparent)]
    Recording(#[from] RecordingError),

    #[error(transparent)]
    Blob(#[from] BlobError),

    #[error("Recording not found: {0}")]
    RecordingNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Error code and message pair for display
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        let code = match &error {
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Recording(RecordingError::PermissionDenied(_)) => "PERMISSION_DENIED",
            AppError::Recording(_) => "RECORDING_ERROR",
            AppError::Blob(_) => "BLOB_ERROR",
            AppError::RecordingNotFound(_) => "NOT_FOUND",
            AppError::InvalidInput(_) => "INVALID_INPUT",
        };

        ErrorResponse {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
