//! Anti-CSRF handshake record for the GitHub redirect flow.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How long an unconsumed handshake stays valid.
pub const HANDSHAKE_TTL_SECS: i64 = 600;

/// Correlates an outbound authorization redirect with its inbound callback.
/// Persisted when the flow starts (the redirect unloads the page, so memory
/// won't do) and consumed exactly once when the callback is processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Handshake {
    /// Unguessable state value echoed back by the provider
    pub state: String,
    /// When the flow was initiated
    pub created_at: DateTime<Utc>,
}

impl Handshake {
    /// Issue a fresh handshake with a random state value.
    pub fn issue() -> Self {
        Self {
            state: generate_state(),
            created_at: Utc::now(),
        }
    }

    /// Whether the handshake has outlived its validity window.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.created_at).num_seconds() > HANDSHAKE_TTL_SECS
    }
}

/// Generate a cryptographically random state parameter.
///
/// 16 random bytes, base64url-encoded (22 characters).
pub fn generate_state() -> String {
    let random_bytes: [u8; 16] = rand::thread_rng().gen();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_state_is_url_safe() {
        let state = generate_state();
        assert_eq!(state.len(), 22);
        assert!(state
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_state_uniqueness() {
        assert_ne!(generate_state(), generate_state());
    }

    #[test]
    fn test_expiry_window() {
        let handshake = Handshake::issue();
        let now = Utc::now();
        assert!(!handshake.is_expired(now));
        assert!(handshake.is_expired(now + Duration::seconds(HANDSHAKE_TTL_SECS + 1)));
    }

    #[test]
    fn test_roundtrips_through_json() {
        let handshake = Handshake::issue();
        let json = serde_json::to_string(&handshake).unwrap();
        let restored: Handshake = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.state, handshake.state);
    }
}
