//! Error taxonomy for identity service calls.

use thiserror::Error;

/// Error type for identity service operations.
///
/// Every failure a caller may want to branch on is a distinct variant;
/// in particular `RateLimited` is kept separate from the generic cases so
/// the UI can show a cooldown message instead of a retry prompt.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    /// Wrong email/password (or wrong current password on update)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Malformed request fields, with the server's message when available
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Duplicate resource (e.g. an already-registered email)
    #[error("Already exists")]
    Conflict,

    /// Too many attempts; the caller decides when to retry
    #[error("Rate limited")]
    RateLimited,

    /// Missing, expired, or rejected access token
    #[error("Unauthorized")]
    Unauthorized,

    /// Transport failure or unexpected server error
    #[error("Network error: {0}")]
    Network(String),

    /// Success status but a body that does not match the wire contract
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Result type for identity service operations.
pub type ApiResult<T> = Result<T, ApiError>;
