//! The identity service operation surface, as a trait.

use crate::{ApiResult, AuthPayload, NewUser, User};
use std::future::Future;

/// Operations against the identity service.
///
/// Implemented by [`crate::IdentityClient`] over HTTP and by stub transports
/// in tests. All methods are stateless with respect to this object: the
/// access token, where one is needed, is an explicit argument.
pub trait IdentityApi: Send + Sync {
    /// Password login.
    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = ApiResult<AuthPayload>> + Send;

    /// Account registration.
    fn register(&self, profile: &NewUser) -> impl Future<Output = ApiResult<AuthPayload>> + Send;

    /// Fetch the user the given access token belongs to.
    fn current_user(&self, access_token: &str) -> impl Future<Output = ApiResult<User>> + Send;

    /// Change the password for the authenticated user.
    fn update_password(
        &self,
        access_token: &str,
        current: &str,
        next: &str,
    ) -> impl Future<Output = ApiResult<()>> + Send;

    /// Server-side session invalidation.
    fn logout(&self, access_token: &str) -> impl Future<Output = ApiResult<()>> + Send;

    /// Exchange a Google credential for a Worklink session.
    fn exchange_google(
        &self,
        credential: &str,
    ) -> impl Future<Output = ApiResult<AuthPayload>> + Send;

    /// Exchange a GitHub authorization code for a Worklink session.
    fn exchange_github(&self, code: &str) -> impl Future<Output = ApiResult<AuthPayload>> + Send;
}
