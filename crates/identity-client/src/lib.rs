//! Stateless HTTP client for the Worklink identity service.
//!
//! This crate translates domain operations (login, register, current-user,
//! password update, logout, OAuth credential/code exchange) into JSON requests
//! and normalizes every response into either a typed payload or an [`ApiError`]
//! from the shared taxonomy.
//!
//! The client owns no state: access tokens come in as arguments and token
//! persistence is the caller's job. That keeps it independently testable, and
//! the [`IdentityApi`] trait lets the session engine run against a stubbed
//! transport.

mod api;
mod client;
mod error;
mod types;

pub use api::IdentityApi;
pub use client::{IdentityClient, DEFAULT_API_URL};
pub use error::{ApiError, ApiResult};
pub use types::{AuthPayload, NewUser, User};
