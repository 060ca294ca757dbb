//! Error types for the OAuth coordinators.

use auth_storage::StorageError;
use identity_client::ApiError;
use thiserror::Error;

/// Error type for OAuth coordinator operations.
#[derive(Error, Debug)]
pub enum OAuthError {
    /// No client identifier configured for this provider
    #[error("{0} sign-in is not configured")]
    NotConfigured(&'static str),

    /// The user dismissed the provider's prompt; not an error to display
    #[error("Sign-in cancelled")]
    UserCancelled,

    /// Provider SDK missing or failed to load
    #[error("Sign-in provider unavailable")]
    ProviderUnavailable,

    /// The provider rejected the authorization request
    #[error("Provider denied authorization: {0}")]
    ProviderDenied(String),

    /// Callback arrived without a required query parameter
    #[error("Callback missing required parameter: {0}")]
    MissingParameters(&'static str),

    /// Callback state does not match a pending, unconsumed handshake
    #[error("OAuth state mismatch")]
    StateMismatch,

    /// Handshake persistence failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Handshake encoding failure
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Failure from the identity service during code exchange
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result type for OAuth coordinator operations.
pub type OAuthResult<T> = Result<T, OAuthError>;
