use thiserror::Error;

/// Error taxonomy for the catalog core.
///
/// Authorization failures are never retried automatically; backend
/// failures are surfaced as-is without built-in retry.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("No valid recipients: {0}")]
    NoValidRecipients(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::BackendUnavailable(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Internal(format!("Serialization error: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
