//! Application error types

use serde::Serialize;
use thiserror::Error;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Non-2xx response from the backend. `detail` is the server-supplied
    /// message, surfaced verbatim to the user.
    #[error("{detail}")]
    Api { status: u16, detail: String },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The message an embedding UI should show for this error.
    ///
    /// Server-rejected requests surface the backend `detail` verbatim;
    /// transport failures collapse to a generic message. Neither is
    /// retried automatically; the user re-triggers the action.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Http(_) => "Server error".to_string(),
            AppError::Api { detail, .. } => detail.clone(),
            AppError::Auth(msg) | AppError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Serializable error response for embedding frontends
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<AppError> for ErrorResponse {
    fn from(err: AppError) -> Self {
        let code = match &err {
            AppError::Http(_) => "HTTP_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Api { .. } => "API_ERROR",
            AppError::Auth(_) => "AUTH_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        };

        ErrorResponse {
            code: code.to_string(),
            message: err.user_message(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
