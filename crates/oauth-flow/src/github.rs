//! GitHub two-phase redirect flow.

use crate::{Handshake, OAuthError, OAuthResult, ProviderConfig};
use auth_storage::TokenStore;
use chrono::Utc;
use identity_client::{AuthPayload, IdentityApi};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// GitHub's authorization endpoint.
pub const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";

const GITHUB_SCOPES: &str = "read:user user:email";

/// Query parameters received on the callback redirect.
#[derive(Debug, Clone, Default)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Parse callback parameters from a raw query string
    /// (`code=...&state=...`).
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = value.into_owned();
            match key.as_ref() {
                "code" => params.code = Some(value),
                "state" => params.state = Some(value),
                "error" => params.error = Some(value),
                "error_description" => params.error_description = Some(value),
                _ => {}
            }
        }
        params
    }
}

/// Coordinator for the GitHub redirect flow.
///
/// Phase 1 ([`begin`](Self::begin)) persists a single-use handshake and hands
/// back the authorize URL; navigating there replaces the page, so nothing
/// returns in-process. Phase 2 ([`complete`](Self::complete)) validates the
/// callback against the handshake before any network call and exchanges the
/// code through the identity service.
pub struct GithubCoordinator {
    config: ProviderConfig,
    store: Arc<TokenStore>,
}

impl GithubCoordinator {
    pub fn new(config: ProviderConfig, store: Arc<TokenStore>) -> Self {
        Self { config, store }
    }

    /// Start the flow: issue and persist a handshake, return the authorize
    /// URL carrying `client_id`, `redirect_uri` and `state`.
    pub fn begin(&self) -> OAuthResult<Url> {
        let client_id = self
            .config
            .github_client_id
            .as_deref()
            .ok_or(OAuthError::NotConfigured("github"))?;
        let redirect_uri = self
            .config
            .github_redirect_uri
            .as_deref()
            .ok_or(OAuthError::NotConfigured("github"))?;

        let handshake = Handshake::issue();
        self.store.put_handshake(&serde_json::to_string(&handshake)?)?;

        let mut url = Url::parse(GITHUB_AUTHORIZE_URL).expect("valid authorize URL");
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("state", &handshake.state)
            .append_pair("scope", GITHUB_SCOPES);

        info!("github authorization initiated");
        Ok(url)
    }

    /// Finish the flow from callback parameters.
    ///
    /// Validation order is fixed: provider error, then missing parameters,
    /// then state-vs-handshake, all before the identity service is
    /// contacted. The handshake is consumed on first use, so a replayed
    /// callback fails with `StateMismatch`.
    pub async fn complete<I: IdentityApi>(
        &self,
        params: CallbackParams,
        api: &I,
    ) -> OAuthResult<AuthPayload> {
        if let Some(error) = params.error {
            // The round trip is over either way; drop the handshake too.
            if let Err(err) = self.store.clear_handshake() {
                warn!(error = %err, "failed to discard handshake after provider denial");
            }
            let description = params.error_description.unwrap_or(error);
            return Err(OAuthError::ProviderDenied(description));
        }

        let code = params.code.ok_or(OAuthError::MissingParameters("code"))?;
        let state = params.state.ok_or(OAuthError::MissingParameters("state"))?;

        let stored = self
            .store
            .take_handshake()?
            .ok_or(OAuthError::StateMismatch)?;
        let handshake: Handshake =
            serde_json::from_str(&stored).map_err(|_| OAuthError::StateMismatch)?;

        if handshake.is_expired(Utc::now()) {
            debug!("github handshake expired before callback");
            return Err(OAuthError::StateMismatch);
        }
        if handshake.state != state {
            return Err(OAuthError::StateMismatch);
        }

        debug!("github state validated, exchanging code");
        Ok(api.exchange_github(&code).await?)
    }
}
