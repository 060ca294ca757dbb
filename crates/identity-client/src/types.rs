//! Wire types for the identity service.

use serde::{Deserialize, Serialize};

/// A Worklink user as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User UUID
    pub id: String,
    /// Account email
    pub email: String,
    /// Public display name
    pub display_name: String,
    /// Marketplace role (e.g. "client", "freelancer"); unset until the
    /// post-registration role step
    #[serde(default)]
    pub role: Option<String>,
}

/// Successful login/register/OAuth-exchange response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub user: User,
    /// Access token (opaque)
    pub token: String,
    /// Refresh token (opaque)
    pub refresh_token: String,
}

/// Registration profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_payload_wire_format() {
        let json = r#"{
            "user": {"id": "u-1", "email": "a@b.co", "displayName": "Ada", "role": "freelancer"},
            "token": "acc",
            "refreshToken": "ref"
        }"#;

        let payload: AuthPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.user.id, "u-1");
        assert_eq!(payload.user.display_name, "Ada");
        assert_eq!(payload.token, "acc");
        assert_eq!(payload.refresh_token, "ref");
    }

    #[test]
    fn test_user_role_defaults_to_none() {
        let json = r#"{"id": "u-2", "email": "x@y.z", "displayName": "X"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, None);
    }

    #[test]
    fn test_new_user_serialization() {
        let profile = NewUser {
            email: "a@b.co".to_string(),
            password: "hunter2".to_string(),
            display_name: "Ada".to_string(),
            role: None,
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("displayName"));
        assert!(!json.contains("role"));
    }
}
