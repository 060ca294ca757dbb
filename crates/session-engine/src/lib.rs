//! Session state machine for the Worklink client.
//!
//! This crate owns the process-wide authentication state:
//! - the `Unauthenticated → Initializing → Authenticated` lifecycle
//! - sequencing of identity service calls and token persistence
//! - reactive publication of every committed state change to observers
//!
//! The [`SessionManager`] is the single writer of both the session and the
//! token store; coordinators and the API client only hand payloads back to
//! it. Overlapping async operations are serialized by a generation counter:
//! a later-initiated terminal transition (logout, a new login) wins, and
//! results from superseded operations are discarded on resolution.

mod error;
mod manager;
mod session;

pub use error::{ErrorKind, SessionError};
pub use manager::SessionManager;
pub use session::{AuthStatus, Session};

// The session manager's collaborators, re-exported so a shell can wire
// everything from one crate.
pub use auth_storage::{create_token_store, TokenStore};
pub use identity_client::{AuthPayload, IdentityApi, IdentityClient, NewUser, User};
pub use oauth_flow::{CallbackParams, CredentialOutcome, CredentialPrompt, ProviderConfig};
