//! Service error type
//!
//! Every handler error funnels through [`ServiceError`], which knows its API
//! error code and HTTP status.

use crate::config::ConfigError;
use crate::key_file::KeyFileError;
use crate::logging::LoggingError;
use crate::types::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use plonk_verifier::VerifierError;
use thiserror::Error;

/// Root error type for the verifier service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A request word is not valid hex
    #[error("invalid word at {field}[{index}]: {reason}")]
    InvalidWord {
        field: &'static str,
        index: usize,
        reason: String,
    },

    #[error("batch of {0} proofs exceeds limit of {1}")]
    BatchTooLarge(usize, usize),

    #[error("batch is empty")]
    EmptyBatch,

    /// Verifier abort
    #[error("{0}")]
    Verifier(#[from] VerifierError),

    #[error("key file error: {0}")]
    KeyFile(#[from] KeyFileError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::InvalidWord { .. } => "INVALID_WORD",
            ServiceError::BatchTooLarge(..) => "BATCH_TOO_LARGE",
            ServiceError::EmptyBatch => "EMPTY_BATCH",
            ServiceError::Verifier(e) => e.code(),
            ServiceError::KeyFile(_) => "KEY_FILE_ERROR",
            ServiceError::Config(_) => "CONFIG_ERROR",
            ServiceError::Logging(_) => "LOGGING_ERROR",
            ServiceError::Io(_) => "IO_ERROR",
            ServiceError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller sent something unusable, as opposed to a server fault
    pub fn is_client_error(&self) -> bool {
        match self {
            ServiceError::InvalidWord { .. }
            | ServiceError::BatchTooLarge(..)
            | ServiceError::EmptyBatch => true,
            ServiceError::Verifier(e) => e.is_proof_rejection(),
            _ => false,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::BatchTooLarge(..) => StatusCode::PAYLOAD_TOO_LARGE,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(self.error_code(), self.to_string());
        (status, Json(body)).into_response()
    }
}

/// Result type alias using ServiceError
pub type Result<T> = std::result::Result<T, ServiceError>;
