//! The session manager: single writer of session state and token slots.

use crate::{AuthStatus, ErrorKind, Session, SessionError};
use auth_storage::TokenStore;
use identity_client::{ApiError, AuthPayload, IdentityApi, NewUser};
use oauth_flow::{
    CallbackParams, CredentialPrompt, GithubCoordinator, GoogleCoordinator, OAuthError,
    ProviderConfig,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::Url;

/// Owns the process-wide session and sequences every operation that can
/// change it.
///
/// Concurrency model: operations may overlap at their await points, but each
/// takes a generation number before suspending and commits its result only
/// if no later operation has started since (`send_if_modified` closures run
/// serialized, so the check and the mutation are atomic with respect to each
/// other). A stale `current_user` resolving after logout cannot resurrect
/// the session.
pub struct SessionManager<I: IdentityApi> {
    api: I,
    store: Arc<TokenStore>,
    google: GoogleCoordinator,
    github: GithubCoordinator,
    generation: AtomicU64,
    tx: watch::Sender<Session>,
}

impl<I: IdentityApi> SessionManager<I> {
    /// Create a manager over the given transport, token store, and provider
    /// configuration. The session starts `Unauthenticated`; call
    /// [`initialize`](Self::initialize) once at startup to restore a
    /// persisted session.
    pub fn new(api: I, store: Arc<TokenStore>, providers: ProviderConfig) -> Self {
        let (tx, _rx) = watch::channel(Session::default());
        Self {
            google: GoogleCoordinator::new(providers.clone()),
            github: GithubCoordinator::new(providers, store.clone()),
            api,
            store,
            generation: AtomicU64::new(0),
            tx,
        }
    }

    /// Subscribe to session changes. Every committed transition is
    /// published; receivers always see the latest state.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Snapshot of the current session.
    pub fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    /// Restore a persisted session at startup.
    ///
    /// No-op unless `Unauthenticated`, so only one initialization sequence
    /// runs per process. A rejected stored token is an expected condition:
    /// it clears the store and settles `Unauthenticated` without surfacing
    /// an error.
    pub async fn initialize(&self) {
        if !matches!(self.tx.borrow().status, AuthStatus::Unauthenticated) {
            debug!("initialize skipped: session already active");
            return;
        }

        let token = match self.store.access_token() {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("no stored token, staying unauthenticated");
                return;
            }
            Err(err) => {
                warn!(error = %err, "token store unreadable at startup");
                return;
            }
        };

        let generation = self.next_generation();
        if !self.commit(generation, |session| {
            session.status = AuthStatus::Initializing;
        }) {
            return;
        }

        match self.api.current_user(&token).await {
            Ok(user) => {
                let email = user.email.clone();
                if self.commit(generation, |session| {
                    session.status = AuthStatus::Authenticated(user);
                    session.last_error = None;
                }) {
                    info!(email = %email, "session restored from stored token");
                }
            }
            Err(err) => {
                // Silent recovery: an expired token is not an error the
                // user needs to see.
                debug!(error = %err, "stored token rejected, clearing session");
                self.commit(generation, |session| {
                    if let Err(err) = self.store.clear_tokens() {
                        warn!(error = %err, "failed to clear rejected tokens");
                    }
                    session.status = AuthStatus::Unauthenticated;
                });
            }
        }
    }

    /// Password login.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), SessionError> {
        let generation = self.next_generation();
        match self.api.login(email, password).await {
            Ok(payload) => self.establish(generation, payload),
            Err(err) => Err(self.fail_auth(generation, err.into())),
        }
    }

    /// Account registration. Converges on the same post-conditions as login.
    pub async fn register(&self, profile: &NewUser) -> Result<(), SessionError> {
        let generation = self.next_generation();
        match self.api.register(profile).await {
            Ok(payload) => self.establish(generation, payload),
            Err(err) => Err(self.fail_auth(generation, err.into())),
        }
    }

    /// Google sign-in: run the provider prompt, then exchange the credential.
    ///
    /// Cancellation returns `UserCancelled` without touching the session;
    /// the user closing the prompt is not a failure to display.
    pub async fn login_with_google<P: CredentialPrompt>(
        &self,
        prompt: &P,
    ) -> Result<(), SessionError> {
        let credential = match self.google.acquire(prompt).await {
            Ok(credential) => credential,
            Err(OAuthError::UserCancelled) => {
                debug!("google sign-in cancelled by user");
                return Err(SessionError::new(
                    ErrorKind::UserCancelled,
                    "sign-in cancelled",
                ));
            }
            Err(err) => {
                let generation = self.next_generation();
                return Err(self.fail_auth(generation, err.into()));
            }
        };

        let generation = self.next_generation();
        match self.api.exchange_google(&credential).await {
            Ok(payload) => self.establish(generation, payload),
            Err(err) => Err(self.fail_auth(generation, err.into())),
        }
    }

    /// GitHub sign-in, phase 1: persist a handshake and hand back the
    /// authorize URL for the shell to navigate to. Navigation replaces the
    /// page, so nothing more happens in-process until the callback.
    pub fn begin_github_login(&self) -> Result<Url, SessionError> {
        self.github.begin().map_err(SessionError::from)
    }

    /// GitHub sign-in, phase 2: validate the callback and exchange the code.
    /// Forged or replayed callbacks fail before any network call.
    pub async fn complete_github_login(
        &self,
        params: CallbackParams,
    ) -> Result<(), SessionError> {
        let generation = self.next_generation();
        match self.github.complete(params, &self.api).await {
            Ok(payload) => self.establish(generation, payload),
            Err(err) => Err(self.fail_auth(generation, err.into())),
        }
    }

    /// End the session. Server-side invalidation is best-effort: its failure
    /// never blocks local teardown, and calling this twice is harmless.
    pub async fn logout(&self) {
        // Taking a generation first makes every in-flight operation stale.
        let generation = self.next_generation();

        if let Ok(Some(token)) = self.store.access_token() {
            if let Err(err) = self.api.logout(&token).await {
                warn!(error = %err, "server-side logout failed, clearing local session anyway");
            }
        }

        self.commit(generation, |session| {
            if let Err(err) = self.store.clear_tokens() {
                warn!(error = %err, "failed to clear tokens on logout");
            }
            session.status = AuthStatus::Unauthenticated;
            session.last_error = None;
        });
        info!("logged out");
    }

    /// Change the password. Status and user are unchanged either way;
    /// success clears the last error, failure records it.
    pub async fn update_password(&self, current: &str, next: &str) -> Result<(), SessionError> {
        let token = match self.store.access_token() {
            Ok(Some(token)) => token,
            _ => {
                let err = SessionError::new(ErrorKind::Unauthorized, "no active session");
                return Err(err);
            }
        };

        let generation = self.generation.load(Ordering::SeqCst);
        match self.api.update_password(&token, current, next).await {
            Ok(()) => {
                self.commit(generation, |session| {
                    session.last_error = None;
                });
                Ok(())
            }
            Err(err) => {
                let err = SessionError::from(err);
                self.commit(generation, |session| {
                    session.last_error = Some(err.clone());
                });
                Err(err)
            }
        }
    }

    /// Optimistic local patch of the user's marketplace role, used by the
    /// post-registration role step. No network round-trip happens here; the
    /// next [`refresh`](Self::refresh) is authoritative and may overwrite it.
    pub fn assign_role(&self, role: &str) -> Result<(), SessionError> {
        let mut patched = false;
        self.tx.send_if_modified(|session| {
            if let AuthStatus::Authenticated(user) = &mut session.status {
                user.role = Some(role.to_string());
                patched = true;
                true
            } else {
                false
            }
        });

        if patched {
            debug!(role = %role, "role assigned locally");
            Ok(())
        } else {
            Err(SessionError::new(
                ErrorKind::Unauthorized,
                "no authenticated user to assign a role to",
            ))
        }
    }

    /// Reconcile the in-memory user with the identity service.
    ///
    /// `Unauthorized` means the token expired since login; that gets the
    /// same silent teardown as initialization. Other failures are recorded
    /// without changing status.
    pub async fn refresh(&self) -> Result<(), SessionError> {
        let token = match self.store.access_token() {
            Ok(Some(token)) => token,
            _ => {
                return Err(SessionError::new(ErrorKind::Unauthorized, "no active session"));
            }
        };

        let generation = self.generation.load(Ordering::SeqCst);
        match self.api.current_user(&token).await {
            Ok(user) => {
                self.commit(generation, |session| {
                    session.status = AuthStatus::Authenticated(user);
                    session.last_error = None;
                });
                Ok(())
            }
            Err(ApiError::Unauthorized) => {
                debug!("access token expired, tearing down session");
                self.commit(generation, |session| {
                    if let Err(err) = self.store.clear_tokens() {
                        warn!(error = %err, "failed to clear expired tokens");
                    }
                    session.status = AuthStatus::Unauthenticated;
                });
                Ok(())
            }
            Err(err) => {
                let err = SessionError::from(err);
                self.commit(generation, |session| {
                    session.last_error = Some(err.clone());
                });
                Err(err)
            }
        }
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply a mutation and publish it, unless a later operation has started
    /// since `generation` was taken. Returns whether the mutation ran.
    fn commit(&self, generation: u64, mutate: impl FnOnce(&mut Session)) -> bool {
        self.tx.send_if_modified(|session| {
            if self.generation.load(Ordering::SeqCst) != generation {
                debug!("discarding stale result");
                return false;
            }
            mutate(session);
            true
        })
    }

    /// Persist the token pair and enter `Authenticated`. This is the
    /// convergence point for login, registration, and both OAuth flows.
    fn establish(&self, generation: u64, payload: AuthPayload) -> Result<(), SessionError> {
        let AuthPayload {
            user,
            token,
            refresh_token,
        } = payload;

        let mut storage_failure = None;
        let applied = self.tx.send_if_modified(|session| {
            if self.generation.load(Ordering::SeqCst) != generation {
                debug!("discarding stale auth payload");
                return false;
            }
            // Persist inside the guarded closure so a racing logout cannot
            // interleave between the write and the transition.
            if let Err(err) = self.store.set_tokens(&token, &refresh_token) {
                storage_failure = Some(SessionError::new(ErrorKind::Storage, err.to_string()));
                return false;
            }
            session.status = AuthStatus::Authenticated(user);
            session.last_error = None;
            true
        });

        if let Some(err) = storage_failure {
            return Err(self.fail_auth(generation, err));
        }
        if applied {
            info!("session established");
        }
        Ok(())
    }

    /// Settle `Unauthenticated` with a surfaced error after a failed login,
    /// registration, or OAuth completion. Returns the error for the caller.
    fn fail_auth(&self, generation: u64, err: SessionError) -> SessionError {
        self.commit(generation, |session| {
            session.status = AuthStatus::Unauthenticated;
            session.last_error = Some(err.clone());
        });
        err
    }
}
