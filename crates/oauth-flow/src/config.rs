//! Provider configuration.

/// Client identifiers for the sign-in providers.
///
/// Absence of an identifier disables that provider's coordinator: the flow
/// refuses up front with `NotConfigured` instead of attempting the handshake.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    /// Google OAuth client ID
    pub google_client_id: Option<String>,
    /// GitHub OAuth app client ID
    pub github_client_id: Option<String>,
    /// Redirect URI registered with the GitHub OAuth app
    pub github_redirect_uri: Option<String>,
}

impl ProviderConfig {
    /// Read provider identifiers from the environment.
    ///
    /// Consumes GOOGLE_CLIENT_ID, GITHUB_CLIENT_ID and GITHUB_REDIRECT_URI;
    /// empty values count as unset.
    pub fn from_env() -> Self {
        Self {
            google_client_id: env_non_empty("GOOGLE_CLIENT_ID"),
            github_client_id: env_non_empty("GITHUB_CLIENT_ID"),
            github_redirect_uri: env_non_empty("GITHUB_REDIRECT_URI"),
        }
    }

    /// Set the Google client ID.
    #[must_use]
    pub fn with_google(mut self, client_id: impl Into<String>) -> Self {
        self.google_client_id = Some(client_id.into());
        self
    }

    /// Set the GitHub client ID and redirect URI.
    #[must_use]
    pub fn with_github(
        mut self,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        self.github_client_id = Some(client_id.into());
        self.github_redirect_uri = Some(redirect_uri.into());
        self
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
