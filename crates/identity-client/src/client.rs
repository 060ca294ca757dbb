//! HTTP implementation of the identity service client.

use crate::{ApiError, ApiResult, AuthPayload, IdentityApi, NewUser, User};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default identity service URL (can be overridden at compile time via the
/// IDENTITY_API_URL env var).
pub const DEFAULT_API_URL: &str = match option_env!("IDENTITY_API_URL") {
    Some(url) => url,
    None => "https://api.worklink.dev",
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

#[derive(Serialize)]
struct GoogleExchangeRequest<'a> {
    credential: &'a str,
}

#[derive(Serialize)]
struct GithubExchangeRequest<'a> {
    code: &'a str,
}

#[derive(Deserialize)]
struct CurrentUserResponse {
    user: User,
}

/// Server error bodies carry the message under either `message` or `error`.
#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for the identity service.
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
}

impl IdentityClient {
    /// Create a client against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Create a client against the configured URL, honoring a runtime
    /// IDENTITY_API_URL override.
    pub fn from_env() -> Self {
        let url = std::env::var("IDENTITY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(url)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn payload_or_error(&self, response: Response) -> ApiResult<AuthPayload> {
        if response.status().is_success() {
            Ok(response.json::<AuthPayload>().await?)
        } else {
            Err(failure(response).await)
        }
    }
}

impl IdentityApi for IdentityClient {
    async fn login(&self, email: &str, password: &str) -> ApiResult<AuthPayload> {
        debug!(endpoint = "/auth/login", "identity request");
        let response = self
            .http
            .post(self.endpoint("/auth/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        self.payload_or_error(response)
            .await
            .map_err(credentials_context)
    }

    async fn register(&self, profile: &NewUser) -> ApiResult<AuthPayload> {
        debug!(endpoint = "/auth/register", "identity request");
        let response = self
            .http
            .post(self.endpoint("/auth/register"))
            .json(profile)
            .send()
            .await?;
        self.payload_or_error(response).await
    }

    async fn current_user(&self, access_token: &str) -> ApiResult<User> {
        debug!(endpoint = "/auth/me", "identity request");
        let response = self
            .http
            .get(self.endpoint("/auth/me"))
            .bearer_auth(access_token)
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json::<CurrentUserResponse>().await?.user)
        } else {
            Err(failure(response).await)
        }
    }

    async fn update_password(
        &self,
        access_token: &str,
        current: &str,
        next: &str,
    ) -> ApiResult<()> {
        debug!(endpoint = "/auth/password", "identity request");
        let response = self
            .http
            .put(self.endpoint("/auth/password"))
            .bearer_auth(access_token)
            .json(&PasswordRequest {
                current_password: current,
                new_password: next,
            })
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            // A rejected current password arrives as 401
            Err(credentials_context(failure(response).await))
        }
    }

    async fn logout(&self, access_token: &str) -> ApiResult<()> {
        debug!(endpoint = "/auth/logout", "identity request");
        let response = self
            .http
            .post(self.endpoint("/auth/logout"))
            .bearer_auth(access_token)
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(failure(response).await)
        }
    }

    async fn exchange_google(&self, credential: &str) -> ApiResult<AuthPayload> {
        debug!(endpoint = "/auth/google", "identity request");
        let response = self
            .http
            .post(self.endpoint("/auth/google"))
            .json(&GoogleExchangeRequest { credential })
            .send()
            .await?;
        self.payload_or_error(response).await
    }

    async fn exchange_github(&self, code: &str) -> ApiResult<AuthPayload> {
        debug!(endpoint = "/auth/github", "identity request");
        let response = self
            .http
            .post(self.endpoint("/auth/github"))
            .json(&GithubExchangeRequest { code })
            .send()
            .await?;
        self.payload_or_error(response).await
    }
}

/// Map a non-success response to the error taxonomy.
async fn failure(response: Response) -> ApiError {
    let status = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message.or(body.error));
    tracing::error!(status = %status, "identity request failed");
    classify_status(status, message)
}

/// On endpoints where the proof being checked *is* the password, a 401 means
/// the credentials were wrong, not that the session expired.
fn credentials_context(err: ApiError) -> ApiError {
    match err {
        ApiError::Unauthorized => ApiError::InvalidCredentials,
        other => other,
    }
}

fn classify_status(status: StatusCode, message: Option<String>) -> ApiError {
    match status.as_u16() {
        401 | 403 => ApiError::Unauthorized,
        409 => ApiError::Conflict,
        429 => ApiError::RateLimited,
        400 | 422 => ApiError::Validation(message.unwrap_or_else(|| "invalid request".to_string())),
        _ => ApiError::Network(format!("unexpected status {}", status)),
    }
}
