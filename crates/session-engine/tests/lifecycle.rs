//! Session lifecycle tests against a stubbed identity transport.

use auth_storage::TokenStore;
use identity_client::{ApiError, ApiResult, AuthPayload, IdentityApi, NewUser, User};
use oauth_flow::{CallbackParams, CredentialOutcome, CredentialPrompt, ProviderConfig};
use session_engine::{AuthStatus, ErrorKind, SessionManager};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

fn user_for(email: &str) -> User {
    User {
        id: format!("id-{email}"),
        email: email.to_string(),
        display_name: email.split('@').next().unwrap_or(email).to_string(),
        role: None,
    }
}

fn payload_for(email: &str) -> AuthPayload {
    AuthPayload {
        user: user_for(email),
        token: format!("access-{email}"),
        refresh_token: format!("refresh-{email}"),
    }
}

/// Scriptable identity transport. Errors are queued one-shot; calls are
/// counted so tests can assert what was (not) reached.
#[derive(Clone, Default)]
struct StubApi {
    state: Arc<StubState>,
}

#[derive(Default)]
struct StubState {
    login_error: Mutex<Option<ApiError>>,
    register_error: Mutex<Option<ApiError>>,
    /// Next `current_user` response; `None` means `Unauthorized`
    current_user_result: Mutex<Option<ApiResult<User>>>,
    /// When set, `current_user` parks until the gate is notified
    current_user_gate: Mutex<Option<Arc<Notify>>>,
    password_error: Mutex<Option<ApiError>>,
    logout_error: Mutex<Option<ApiError>>,
    logout_calls: AtomicUsize,
    exchange_github_calls: AtomicUsize,
    exchange_google_calls: AtomicUsize,
}

impl StubApi {
    fn fail_next_login(&self, err: ApiError) {
        *self.state.login_error.lock().unwrap() = Some(err);
    }

    fn next_current_user(&self, result: ApiResult<User>) {
        *self.state.current_user_result.lock().unwrap() = Some(result);
    }

    fn gate_current_user(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.state.current_user_gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

impl IdentityApi for StubApi {
    async fn login(&self, email: &str, _password: &str) -> ApiResult<AuthPayload> {
        if let Some(err) = self.state.login_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(payload_for(email))
    }

    async fn register(&self, profile: &NewUser) -> ApiResult<AuthPayload> {
        if let Some(err) = self.state.register_error.lock().unwrap().take() {
            return Err(err);
        }
        let mut payload = payload_for(&profile.email);
        payload.user.role = profile.role.clone();
        Ok(payload)
    }

    async fn current_user(&self, _access_token: &str) -> ApiResult<User> {
        let gate = self.state.current_user_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.state
            .current_user_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Err(ApiError::Unauthorized))
    }

    async fn update_password(
        &self,
        _access_token: &str,
        _current: &str,
        _next: &str,
    ) -> ApiResult<()> {
        match self.state.password_error.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn logout(&self, _access_token: &str) -> ApiResult<()> {
        self.state.logout_calls.fetch_add(1, Ordering::SeqCst);
        match self.state.logout_error.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn exchange_google(&self, _credential: &str) -> ApiResult<AuthPayload> {
        self.state.exchange_google_calls.fetch_add(1, Ordering::SeqCst);
        Ok(payload_for("google-user@example.com"))
    }

    async fn exchange_github(&self, _code: &str) -> ApiResult<AuthPayload> {
        self.state.exchange_github_calls.fetch_add(1, Ordering::SeqCst);
        Ok(payload_for("github-user@example.com"))
    }
}

struct FixedPrompt(CredentialOutcome);

impl CredentialPrompt for FixedPrompt {
    async fn prompt(&self) -> CredentialOutcome {
        self.0.clone()
    }
}

fn providers() -> ProviderConfig {
    ProviderConfig::default()
        .with_google("google-client")
        .with_github("github-client", "https://app.worklink.dev/auth/github/callback")
}

fn setup() -> (Arc<SessionManager<StubApi>>, StubApi, Arc<TokenStore>) {
    let api = StubApi::default();
    let store = Arc::new(TokenStore::in_memory());
    let manager = Arc::new(SessionManager::new(api.clone(), store.clone(), providers()));
    (manager, api, store)
}

#[tokio::test]
async fn login_establishes_session_and_persists_tokens() {
    let (manager, _api, store) = setup();

    manager.login("ada@example.com", "pw").await.unwrap();

    let session = manager.current();
    assert!(session.is_authenticated());
    assert_eq!(session.user().unwrap().email, "ada@example.com");
    assert_eq!(session.last_error, None);
    assert_eq!(
        store.access_token().unwrap(),
        Some("access-ada@example.com".to_string())
    );
}

#[tokio::test]
async fn observers_see_committed_transitions() {
    let (manager, _api, _store) = setup();
    let mut rx = manager.subscribe();

    manager.login("ada@example.com", "pw").await.unwrap();

    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().is_authenticated());
}

#[tokio::test]
async fn rate_limit_is_distinct_from_invalid_credentials() {
    let (manager, api, _store) = setup();

    api.fail_next_login(ApiError::RateLimited);
    let err = manager.login("ada@example.com", "pw").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::RateLimited);
    assert_eq!(
        manager.current().last_error.unwrap().kind,
        ErrorKind::RateLimited
    );

    api.fail_next_login(ApiError::InvalidCredentials);
    let err = manager.login("ada@example.com", "pw").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidCredentials);
    assert!(!manager.current().is_authenticated());
}

#[tokio::test]
async fn register_converges_on_login_postconditions() {
    let (manager, _api, store) = setup();

    let profile = NewUser {
        email: "new@example.com".to_string(),
        password: "pw".to_string(),
        display_name: "New".to_string(),
        role: Some("client".to_string()),
    };
    manager.register(&profile).await.unwrap();

    let session = manager.current();
    assert_eq!(session.user().unwrap().role.as_deref(), Some("client"));
    assert!(store.access_token().unwrap().is_some());
}

#[tokio::test]
async fn duplicate_email_surfaces_conflict() {
    let (manager, api, _store) = setup();
    *api.state.register_error.lock().unwrap() = Some(ApiError::Conflict);

    let profile = NewUser {
        email: "dup@example.com".to_string(),
        password: "pw".to_string(),
        display_name: "Dup".to_string(),
        role: None,
    };
    let err = manager.register(&profile).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert!(!manager.current().is_authenticated());
}

#[tokio::test]
async fn initialize_without_token_settles_unauthenticated() {
    let (manager, _api, _store) = setup();

    manager.initialize().await;

    let session = manager.current();
    assert!(matches!(session.status, AuthStatus::Unauthenticated));
    assert_eq!(session.last_error, None);
}

#[tokio::test]
async fn initialize_restores_persisted_session() {
    let (manager, api, store) = setup();
    store.set_tokens("stored-access", "stored-refresh").unwrap();
    api.next_current_user(Ok(user_for("back@example.com")));

    manager.initialize().await;

    assert_eq!(manager.current().user().unwrap().email, "back@example.com");
}

#[tokio::test]
async fn rejected_stored_token_recovers_silently() {
    let (manager, _api, store) = setup();
    store.set_tokens("expired-access", "expired-refresh").unwrap();
    // Stub answers `current_user` with Unauthorized by default

    manager.initialize().await;

    let session = manager.current();
    assert!(matches!(session.status, AuthStatus::Unauthenticated));
    assert_eq!(session.last_error, None);
    assert_eq!(store.access_token().unwrap(), None);
    assert_eq!(store.refresh_token().unwrap(), None);
}

#[tokio::test]
async fn initialize_is_a_noop_once_authenticated() {
    let (manager, api, _store) = setup();
    manager.login("ada@example.com", "pw").await.unwrap();

    // Would fail loudly if it ran: current_user answers Unauthorized
    api.next_current_user(Err(ApiError::Unauthorized));
    manager.initialize().await;

    assert_eq!(manager.current().user().unwrap().email, "ada@example.com");
}

#[tokio::test]
async fn stale_initialization_does_not_clobber_later_login() {
    let (manager, api, store) = setup();
    store.set_tokens("stale-access", "stale-refresh").unwrap();
    let gate = api.gate_current_user();
    api.next_current_user(Ok(user_for("stale@example.com")));

    let mut rx = manager.subscribe();
    let init = tokio::spawn({
        let manager = manager.clone();
        async move { manager.initialize().await }
    });
    // Wait until initialization is parked inside `current_user`
    rx.wait_for(|s| matches!(s.status, AuthStatus::Initializing))
        .await
        .unwrap();

    manager.login("b@example.com", "pw").await.unwrap();

    // Let the stale lookup resolve successfully; it must be discarded.
    gate.notify_one();
    init.await.unwrap();

    assert_eq!(manager.current().user().unwrap().email, "b@example.com");
    assert_eq!(
        store.access_token().unwrap(),
        Some("access-b@example.com".to_string())
    );
}

#[tokio::test]
async fn logout_is_idempotent_and_unconditional() {
    let (manager, api, store) = setup();
    manager.login("ada@example.com", "pw").await.unwrap();

    // Server-side invalidation fails; local teardown must not care.
    *api.state.logout_error.lock().unwrap() =
        Some(ApiError::Network("connection refused".to_string()));
    manager.logout().await;
    manager.logout().await;

    let session = manager.current();
    assert!(matches!(session.status, AuthStatus::Unauthenticated));
    assert_eq!(session.last_error, None);
    assert_eq!(store.access_token().unwrap(), None);
    assert_eq!(store.refresh_token().unwrap(), None);
}

#[tokio::test]
async fn google_login_exchanges_credential() {
    let (manager, api, _store) = setup();

    let prompt = FixedPrompt(CredentialOutcome::Granted("g-credential".to_string()));
    manager.login_with_google(&prompt).await.unwrap();

    assert_eq!(
        manager.current().user().unwrap().email,
        "google-user@example.com"
    );
    assert_eq!(api.state.exchange_google_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn google_cancellation_leaves_session_untouched() {
    let (manager, api, _store) = setup();
    manager.login("ada@example.com", "pw").await.unwrap();

    let prompt = FixedPrompt(CredentialOutcome::Cancelled);
    let err = manager.login_with_google(&prompt).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::UserCancelled);
    let session = manager.current();
    // No error banner and no state change for a voluntary dismissal
    assert_eq!(session.last_error, None);
    assert_eq!(session.user().unwrap().email, "ada@example.com");
    assert_eq!(api.state.exchange_google_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn google_without_client_id_reports_not_configured() {
    let api = StubApi::default();
    let store = Arc::new(TokenStore::in_memory());
    let manager = SessionManager::new(api.clone(), store, ProviderConfig::default());

    let prompt = FixedPrompt(CredentialOutcome::Granted("unused".to_string()));
    let err = manager.login_with_google(&prompt).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::NotConfigured);
    assert_eq!(
        manager.current().last_error.unwrap().kind,
        ErrorKind::NotConfigured
    );
}

#[tokio::test]
async fn github_flow_through_the_manager() {
    let (manager, api, _store) = setup();

    let url = manager.begin_github_login().unwrap();
    let state = url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap();

    let params = CallbackParams {
        code: Some("gh-code".to_string()),
        state: Some(state),
        ..Default::default()
    };
    manager.complete_github_login(params).await.unwrap();

    assert_eq!(
        manager.current().user().unwrap().email,
        "github-user@example.com"
    );
    assert_eq!(api.state.exchange_github_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn forged_github_callback_never_reaches_the_backend() {
    let (manager, api, _store) = setup();
    manager.begin_github_login().unwrap();

    let params = CallbackParams {
        code: Some("gh-code".to_string()),
        state: Some("forged".to_string()),
        ..Default::default()
    };
    let err = manager.complete_github_login(params).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::StateMismatch);
    assert_eq!(api.state.exchange_github_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        manager.current().last_error.unwrap().kind,
        ErrorKind::StateMismatch
    );
}

#[tokio::test]
async fn password_update_does_not_touch_status() {
    let (manager, api, _store) = setup();
    manager.login("ada@example.com", "pw").await.unwrap();

    *api.state.password_error.lock().unwrap() = Some(ApiError::InvalidCredentials);
    let err = manager.update_password("wrong-old", "new").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidCredentials);

    let session = manager.current();
    assert_eq!(session.user().unwrap().email, "ada@example.com");
    assert_eq!(
        session.last_error.unwrap().kind,
        ErrorKind::InvalidCredentials
    );

    manager.update_password("old", "new").await.unwrap();
    let session = manager.current();
    assert!(session.is_authenticated());
    assert_eq!(session.last_error, None);
}

#[tokio::test]
async fn password_update_requires_a_session() {
    let (manager, _api, _store) = setup();
    let err = manager.update_password("old", "new").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);
}

#[tokio::test]
async fn role_assignment_is_local_and_refresh_is_authoritative() {
    let (manager, api, _store) = setup();
    manager.login("ada@example.com", "pw").await.unwrap();

    manager.assign_role("freelancer").unwrap();
    assert_eq!(
        manager.current().user().unwrap().role.as_deref(),
        Some("freelancer")
    );

    // The server never heard about the role; its answer wins.
    api.next_current_user(Ok(user_for("ada@example.com")));
    manager.refresh().await.unwrap();
    assert_eq!(manager.current().user().unwrap().role, None);
}

#[tokio::test]
async fn role_assignment_without_session_fails() {
    let (manager, _api, _store) = setup();
    let err = manager.assign_role("client").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);
}

#[tokio::test]
async fn refresh_discovers_expiry_and_tears_down_silently() {
    let (manager, _api, store) = setup();
    manager.login("ada@example.com", "pw").await.unwrap();

    // Stub answers `current_user` with Unauthorized by default
    manager.refresh().await.unwrap();

    let session = manager.current();
    assert!(matches!(session.status, AuthStatus::Unauthenticated));
    assert_eq!(session.last_error, None);
    assert_eq!(store.access_token().unwrap(), None);
}

#[tokio::test]
async fn refresh_network_failure_keeps_session() {
    let (manager, api, _store) = setup();
    manager.login("ada@example.com", "pw").await.unwrap();

    api.next_current_user(Err(ApiError::Network("timeout".to_string())));
    let err = manager.refresh().await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Network);
    let session = manager.current();
    assert!(session.is_authenticated());
    assert_eq!(session.last_error.unwrap().kind, ErrorKind::Network);
}
