//! Storage key constants.

/// Storage keys used by the client.
pub struct StorageKeys;

impl StorageKeys {
    /// Access token issued by the identity service
    pub const ACCESS_TOKEN: &'static str = "access_token";

    /// Refresh token issued by the identity service
    pub const REFRESH_TOKEN: &'static str = "refresh_token";

    /// Pending GitHub OAuth handshake (JSON, single-use)
    pub const OAUTH_HANDSHAKE: &'static str = "oauth_handshake";
}
