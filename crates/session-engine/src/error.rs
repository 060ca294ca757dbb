//! Surfaced session failures.

use identity_client::ApiError;
use oauth_flow::OAuthError;
use serde::Serialize;
use thiserror::Error;

/// Failure categories the UI can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidCredentials,
    Validation,
    Conflict,
    /// Distinct so the UI can show a cooldown message; no automatic retry
    /// happens here
    RateLimited,
    Unauthorized,
    Network,
    UserCancelled,
    ProviderDenied,
    ProviderUnavailable,
    StateMismatch,
    MissingParameters,
    NotConfigured,
    Storage,
}

/// A structured failure attached to the session for display.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{message}")]
#[serde(rename_all = "camelCase")]
pub struct SessionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl SessionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<ApiError> for SessionError {
    fn from(err: ApiError) -> Self {
        let kind = match &err {
            ApiError::InvalidCredentials => ErrorKind::InvalidCredentials,
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Conflict => ErrorKind::Conflict,
            ApiError::RateLimited => ErrorKind::RateLimited,
            ApiError::Unauthorized => ErrorKind::Unauthorized,
            // A malformed success body is a backend fault; show it as such
            ApiError::Network(_) | ApiError::Decode(_) => ErrorKind::Network,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<OAuthError> for SessionError {
    fn from(err: OAuthError) -> Self {
        let kind = match &err {
            OAuthError::NotConfigured(_) => ErrorKind::NotConfigured,
            OAuthError::UserCancelled => ErrorKind::UserCancelled,
            OAuthError::ProviderUnavailable => ErrorKind::ProviderUnavailable,
            OAuthError::ProviderDenied(_) => ErrorKind::ProviderDenied,
            OAuthError::MissingParameters(_) => ErrorKind::MissingParameters,
            OAuthError::StateMismatch => ErrorKind::StateMismatch,
            OAuthError::Storage(_) | OAuthError::Encoding(_) => ErrorKind::Storage,
            OAuthError::Api(inner) => return Self::from(inner.clone()),
        };
        Self::new(kind, err.to_string())
    }
}
