//! Google and GitHub sign-in coordinators for the Worklink client.
//!
//! Each coordinator turns a third-party login interaction into something the
//! identity service can exchange for a Worklink session:
//! - **Google**: an opaque credential obtained from the provider's prompt
//! - **GitHub**: a two-phase redirect: build an authorize URL carrying an
//!   anti-CSRF `state`, then validate the callback and exchange the `code`
//!
//! Coordinators never persist tokens; they hand payloads back to the session
//! engine, which is the only writer of the token slots. The GitHub handshake
//! record is the one thing this crate stores, and it is consumed exactly once.

mod config;
mod error;
mod github;
mod google;
mod handshake;

pub use config::ProviderConfig;
pub use error::{OAuthError, OAuthResult};
pub use github::{CallbackParams, GithubCoordinator, GITHUB_AUTHORIZE_URL};
pub use google::{CredentialOutcome, CredentialPrompt, GoogleCoordinator};
pub use handshake::{Handshake, HANDSHAKE_TTL_SECS};
