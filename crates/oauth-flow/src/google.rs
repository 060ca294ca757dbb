//! Google credential flow.

use crate::{OAuthError, OAuthResult, ProviderConfig};
use std::future::Future;
use tracing::debug;

/// Outcome of the provider's credential prompt.
#[derive(Debug, Clone)]
pub enum CredentialOutcome {
    /// The user completed the prompt; the string is an opaque credential
    /// for the identity service to verify
    Granted(String),
    /// The user dismissed the prompt
    Cancelled,
    /// The provider SDK is missing or failed to load
    Unavailable,
}

/// The surface of the provider's sign-in prompt (the SDK popup in a browser
/// shell, a system browser handoff elsewhere). Cancellation is an expected
/// outcome, not an error.
pub trait CredentialPrompt: Send + Sync {
    fn prompt(&self) -> impl Future<Output = CredentialOutcome> + Send;
}

/// Coordinator for Google sign-in.
#[derive(Clone)]
pub struct GoogleCoordinator {
    config: ProviderConfig,
}

impl GoogleCoordinator {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    /// Run the provider prompt and return the opaque credential.
    ///
    /// Refuses with `NotConfigured` before showing anything when no client
    /// ID is present. The credential still has to be exchanged with the
    /// identity service; that is the caller's job.
    pub async fn acquire<P: CredentialPrompt>(&self, prompt: &P) -> OAuthResult<String> {
        if self.config.google_client_id.is_none() {
            return Err(OAuthError::NotConfigured("google"));
        }

        debug!("opening google credential prompt");
        match prompt.prompt().await {
            CredentialOutcome::Granted(credential) => Ok(credential),
            CredentialOutcome::Cancelled => Err(OAuthError::UserCancelled),
            CredentialOutcome::Unavailable => Err(OAuthError::ProviderUnavailable),
        }
    }
}
