//! The session record published to observers.

use crate::SessionError;
use identity_client::User;
use serde::Serialize;

/// Authentication lifecycle state. The user record lives inside the
/// `Authenticated` variant, so "user present iff authenticated" holds by
/// construction.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(tag = "status", content = "user", rename_all = "camelCase")]
pub enum AuthStatus {
    /// No session; the resting state
    #[default]
    Unauthenticated,
    /// A stored token is being verified at startup
    Initializing,
    /// A verified session for this user
    Authenticated(User),
}

/// The authoritative in-memory record of the current user's authentication
/// state. Exactly one exists per running client; observers receive clones.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub status: AuthStatus,
    /// Last surfaced failure, for UI display; cleared on the next
    /// successful operation
    pub last_error: Option<SessionError>,
}

impl Session {
    /// The authenticated user, if any.
    pub fn user(&self) -> Option<&User> {
        match &self.status {
            AuthStatus::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.status, AuthStatus::Authenticated(_))
    }
}
