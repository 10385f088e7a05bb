//! The authentication session and token manager.
//!
//! State machine: `NotReady -> Unauthenticated <-> Authenticated`.
//!
//! The whole session record (user, access token, refresh token) lives in
//! one [`RwLock`], so logout clears it in a single write. Token refreshes
//! are serialized by a separate [`Mutex`]: a caller that finds the access
//! token inside its padding window takes the refresh lock, re-checks the
//! token (another caller may have refreshed it meanwhile), and only then
//! talks to the backend. Concurrent callers therefore share one refresh.

use std::sync::{Arc, PoisonError};

use tokio::sync::{Mutex, RwLock};
use walletlink_core::{Clock, SystemClock, Token, User};

use crate::api::{AuthBackend, OAuthProvider, SessionResponse};
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::pkce::PkceChallenge;
use crate::store::{StoredTokens, TokenStore};

/// Public view of the session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// `initialize` has not finished.
    NotReady,
    Unauthenticated,
    Authenticated,
}

/// Observer invoked on every [`AuthState`] transition.
pub type AuthStateCallback = Arc<dyn Fn(AuthState) + Send + Sync>;

#[derive(Debug, Clone)]
struct ActiveSession {
    user: User,
    access_token: Token,
    refresh_token: Token,
}

#[derive(Debug)]
enum SessionState {
    NotReady,
    Unauthenticated,
    Authenticated(Box<ActiveSession>),
}

impl SessionState {
    fn kind(&self) -> AuthState {
        match self {
            Self::NotReady => AuthState::NotReady,
            Self::Unauthenticated => AuthState::Unauthenticated,
            Self::Authenticated(_) => AuthState::Authenticated,
        }
    }
}

pub struct AuthSession {
    backend: Arc<dyn AuthBackend>,
    store: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
    expiration_padding: chrono::Duration,
    refresh_token_lifetime: chrono::Duration,
    state: RwLock<SessionState>,
    refresh_lock: Mutex<()>,
    oauth_flow: std::sync::Mutex<Option<PkceChallenge>>,
    callback: std::sync::Mutex<Option<AuthStateCallback>>,
}

impl AuthSession {
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        store: Arc<dyn TokenStore>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            backend,
            store,
            clock: Arc::new(SystemClock),
            expiration_padding: config.expiration_padding,
            refresh_token_lifetime: config.refresh_token_lifetime,
            state: RwLock::new(SessionState::NotReady),
            refresh_lock: Mutex::new(()),
            oauth_flow: std::sync::Mutex::new(None),
            callback: std::sync::Mutex::new(None),
        }
    }

    /// Replace the clock used for expiry checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // ---- state ----

    pub async fn state(&self) -> AuthState {
        self.state.read().await.kind()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state().await == AuthState::Authenticated
    }

    /// The current user, if authenticated.
    pub async fn user(&self) -> Option<User> {
        match &*self.state.read().await {
            SessionState::Authenticated(session) => Some(session.user.clone()),
            _ => None,
        }
    }

    /// Register the state observer, replacing any previous one.
    pub fn set_auth_state_change_callback<F>(&self, callback: F)
    where
        F: Fn(AuthState) + Send + Sync + 'static,
    {
        *self.callback.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(callback));
    }

    // ---- lifecycle ----

    /// Restore the persisted session, if any.
    ///
    /// Always ends in `Authenticated` or `Unauthenticated`; a stored
    /// refresh token that the backend rejects is discarded.
    pub async fn initialize(&self) -> AuthState {
        let _refresh = self.refresh_lock.lock().await;

        let stored = match self.store.load().await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load stored session, starting unauthenticated");
                None
            }
        };

        match stored {
            Some(tokens) if !tokens.refresh_token.is_expired(self.clock.now(), chrono::Duration::zero()) => {
                match self.exchange_refresh_token(&tokens.refresh_token.value).await {
                    Ok(session) => {
                        tracing::info!(user_id = %session.user.id, "Restored auth session");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Stored session could not be restored");
                    }
                }
            }
            Some(_) => {
                tracing::info!("Stored refresh token has expired");
                self.clear_store().await;
                self.transition(SessionState::Unauthenticated).await;
            }
            None => {
                self.transition(SessionState::Unauthenticated).await;
            }
        }

        self.state().await
    }

    /// A valid access token, refreshing first if the cached one is inside
    /// its padding window.
    pub async fn get_access_token(&self) -> Result<String, AuthError> {
        if let Some(token) = self.cached_access_token().await? {
            return Ok(token);
        }

        let _refresh = self.refresh_lock.lock().await;
        if let Some(token) = self.cached_access_token().await? {
            return Ok(token);
        }
        Ok(self.refresh_locked().await?.access_token.value)
    }

    /// Re-exchange the refresh token. Without `force`, an unexpired
    /// session is returned as is.
    pub async fn refresh_session(&self, force: bool) -> Result<User, AuthError> {
        let _refresh = self.refresh_lock.lock().await;
        if !force {
            if let SessionState::Authenticated(session) = &*self.state.read().await {
                if !self.is_expired(&session.access_token) {
                    return Ok(session.user.clone());
                }
            }
        }
        Ok(self.refresh_locked().await?.user)
    }

    // ---- login flows ----

    pub async fn send_email_code(&self, email: &str) -> Result<(), AuthError> {
        self.ensure_ready().await?;
        self.backend.send_email_code(email).await?;
        tracing::info!("Login code sent");
        Ok(())
    }

    pub async fn login_with_email_code(&self, email: &str, code: &str) -> Result<User, AuthError> {
        self.ensure_ready().await?;
        let response = self.backend.authenticate_email(email, code).await?;

        let _refresh = self.refresh_lock.lock().await;
        let session = self.establish(response).await?;
        tracing::info!(user_id = %session.user.id, "Logged in with email code");
        Ok(session.user)
    }

    /// Start an OAuth login and return the URL the user must visit.
    ///
    /// Starting a new flow abandons any previous one.
    pub async fn oauth_authorization_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<String, AuthError> {
        self.ensure_ready().await?;
        let pkce = PkceChallenge::generate();
        let init = self
            .backend
            .oauth_init(provider, redirect_to, &pkce.code_challenge, &pkce.state_code)
            .await?;

        *self.oauth_flow.lock().unwrap_or_else(PoisonError::into_inner) = Some(pkce);
        tracing::info!(%provider, "OAuth flow started");
        Ok(init.url)
    }

    /// Finish the OAuth flow with the `code` and `state` the provider
    /// redirected back with.
    pub async fn login_with_oauth_code(&self, code: &str, state_code: &str) -> Result<User, AuthError> {
        self.ensure_ready().await?;
        let pkce = self
            .oauth_flow
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(AuthError::OAuthNotStarted)?;
        if pkce.state_code != state_code {
            return Err(AuthError::OAuthStateMismatch);
        }

        let response = self
            .backend
            .oauth_authenticate(code, state_code, &pkce.code_verifier)
            .await?;

        let _refresh = self.refresh_lock.lock().await;
        let session = self.establish(response).await?;
        tracing::info!(user_id = %session.user.id, "Logged in with OAuth");
        Ok(session.user)
    }

    /// End the session.
    ///
    /// Local state and the store are cleared even if the backend call
    /// fails.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let _refresh = self.refresh_lock.lock().await;

        let previous = {
            let mut state = self.state.write().await;
            std::mem::replace(&mut *state, SessionState::Unauthenticated)
        };

        if let SessionState::Authenticated(session) = &previous {
            if let Err(e) = self
                .backend
                .logout(&session.access_token.value, &session.refresh_token.value)
                .await
            {
                tracing::warn!(error = %e, "Backend logout failed, session cleared locally");
            }
        }

        let cleared = self.store.clear().await;
        if previous.kind() != AuthState::Unauthenticated {
            self.notify(AuthState::Unauthenticated);
        }
        tracing::info!("Logged out");
        cleared?;
        Ok(())
    }

    // ---- private helpers ----

    fn is_expired(&self, token: &Token) -> bool {
        token.is_expired(self.clock.now(), self.expiration_padding)
    }

    async fn ensure_ready(&self) -> Result<(), AuthError> {
        match self.state().await {
            AuthState::NotReady => Err(AuthError::NotReady),
            _ => Ok(()),
        }
    }

    /// `Some` if the cached access token is still usable, `None` if it
    /// needs a refresh.
    async fn cached_access_token(&self) -> Result<Option<String>, AuthError> {
        match &*self.state.read().await {
            SessionState::NotReady => Err(AuthError::NotReady),
            SessionState::Unauthenticated => Err(AuthError::NotAuthenticated),
            SessionState::Authenticated(session) if self.is_expired(&session.access_token) => Ok(None),
            SessionState::Authenticated(session) => Ok(Some(session.access_token.value.clone())),
        }
    }

    /// Refresh the current session. Caller holds `refresh_lock`.
    async fn refresh_locked(&self) -> Result<ActiveSession, AuthError> {
        let refresh_token = match &*self.state.read().await {
            SessionState::NotReady => return Err(AuthError::NotReady),
            SessionState::Unauthenticated => return Err(AuthError::NotAuthenticated),
            SessionState::Authenticated(session) => session.refresh_token.clone(),
        };

        if refresh_token.is_expired(self.clock.now(), chrono::Duration::zero()) {
            tracing::info!("Refresh token has expired");
            self.clear_store().await;
            self.transition(SessionState::Unauthenticated).await;
            return Err(AuthError::Authentication("refresh token expired".into()));
        }

        self.exchange_refresh_token(&refresh_token.value).await
    }

    /// Exchange `refresh_token` for a new session. Any failure leaves the
    /// session unauthenticated; the store is cleared only when the backend
    /// rejected the token.
    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<ActiveSession, AuthError> {
        let response = match self.backend.refresh_session(refresh_token).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Session refresh failed");
                if e.is_client_error() {
                    self.clear_store().await;
                }
                self.transition(SessionState::Unauthenticated).await;
                return Err(AuthError::Authentication(e.to_string()));
            }
        };

        match self.establish(response).await {
            Ok(session) => {
                tracing::debug!(
                    expires_at = %session.access_token.expires_at,
                    "Access token refreshed",
                );
                Ok(session)
            }
            Err(e) => {
                self.transition(SessionState::Unauthenticated).await;
                Err(AuthError::Authentication(e.to_string()))
            }
        }
    }

    /// Install the tokens from a session response and persist the refresh
    /// token. Caller holds `refresh_lock`.
    async fn establish(&self, response: SessionResponse) -> Result<ActiveSession, AuthError> {
        let access_token =
            Token::from_jwt(response.token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let refresh_token = Token::with_lifetime(
            response.refresh_token,
            self.clock.now(),
            self.refresh_token_lifetime,
        );

        let session = ActiveSession {
            user: User::from_raw(response.user),
            access_token,
            refresh_token: refresh_token.clone(),
        };

        if let Err(e) = self.store.save(&StoredTokens { refresh_token }).await {
            tracing::warn!(error = %e, "Failed to persist refresh token");
        }

        self.transition(SessionState::Authenticated(Box::new(session.clone())))
            .await;
        Ok(session)
    }

    async fn clear_store(&self) {
        if let Err(e) = self.store.clear().await {
            tracing::warn!(error = %e, "Failed to clear token store");
        }
    }

    /// Replace the session record, notifying the observer if the state
    /// kind changed.
    async fn transition(&self, next: SessionState) {
        let (before, after) = {
            let mut state = self.state.write().await;
            let before = state.kind();
            *state = next;
            (before, state.kind())
        };

        if before != after {
            tracing::debug!(from = ?before, to = ?after, "Auth state changed");
            self.notify(after);
        }
    }

    fn notify(&self, state: AuthState) {
        let callback = self
            .callback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(callback) = callback {
            callback(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use walletlink_core::ManualClock;

    use super::*;
    use crate::api::{AuthApiError, OAuthInitResponse};
    use crate::store::MemoryTokenStore;

    const T0: i64 = 1_800_000_000;

    fn at(secs: i64) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn jwt(exp: i64, serial: usize) -> String {
        encode(
            &Header::default(),
            &serde_json::json!({"sub": "did:privy:user", "exp": exp, "serial": serial}),
            &EncodingKey::from_secret(b"test"),
        )
        .unwrap()
    }

    /// Backend that issues a JWT expiring at `next_exp` on every refresh.
    struct FakeBackend {
        refresh_calls: AtomicUsize,
        next_exp: std::sync::Mutex<i64>,
        refresh_status: std::sync::Mutex<Option<u16>>,
    }

    impl FakeBackend {
        fn new() -> Self {
            Self {
                refresh_calls: AtomicUsize::new(0),
                next_exp: std::sync::Mutex::new(T0 + 3600),
                refresh_status: std::sync::Mutex::new(None),
            }
        }

        fn refreshes(&self) -> usize {
            self.refresh_calls.load(Ordering::SeqCst)
        }

        fn fail_refresh_with(&self, status: u16) {
            *self.refresh_status.lock().unwrap() = Some(status);
        }

        fn session(&self, serial: usize) -> SessionResponse {
            let exp = *self.next_exp.lock().unwrap();
            serde_json::from_value(serde_json::json!({
                "user": {"id": "did:privy:user", "linked_accounts": []},
                "token": jwt(exp, serial),
                "refresh_token": format!("refresh-{serial}"),
            }))
            .unwrap()
        }
    }

    #[async_trait]
    impl AuthBackend for FakeBackend {
        async fn refresh_session(&self, _refresh_token: &str) -> Result<SessionResponse, AuthApiError> {
            let serial = self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(Duration::from_millis(20)).await;
            if let Some(status) = *self.refresh_status.lock().unwrap() {
                return Err(AuthApiError::ApiError {
                    status,
                    body: "rejected".into(),
                });
            }
            Ok(self.session(serial))
        }

        async fn logout(&self, _: &str, _: &str) -> Result<(), AuthApiError> {
            Ok(())
        }

        async fn send_email_code(&self, _: &str) -> Result<(), AuthApiError> {
            Ok(())
        }

        async fn authenticate_email(&self, _: &str, _: &str) -> Result<SessionResponse, AuthApiError> {
            Ok(self.session(0))
        }

        async fn oauth_init(
            &self,
            _: OAuthProvider,
            _: &str,
            _: &str,
            _: &str,
        ) -> Result<OAuthInitResponse, AuthApiError> {
            Ok(OAuthInitResponse {
                url: "https://provider.test/authorize".into(),
            })
        }

        async fn oauth_authenticate(&self, _: &str, _: &str, _: &str) -> Result<SessionResponse, AuthApiError> {
            Ok(self.session(0))
        }
    }

    struct Harness {
        backend: Arc<FakeBackend>,
        store: Arc<MemoryTokenStore>,
        clock: Arc<ManualClock>,
        session: AuthSession,
    }

    fn harness(stored: Option<&str>) -> Harness {
        let backend = Arc::new(FakeBackend::new());
        let store = Arc::new(match stored {
            Some(value) => MemoryTokenStore::with_tokens(StoredTokens {
                refresh_token: Token::new(value, at(T0 + 86_400)),
            }),
            None => MemoryTokenStore::new(),
        });
        let clock = Arc::new(ManualClock::new(at(T0)));
        let session = AuthSession::new(
            backend.clone(),
            store.clone(),
            &AuthConfig::new("app", "client"),
        )
        .with_clock(clock.clone());
        Harness {
            backend,
            store,
            clock,
            session,
        }
    }

    #[tokio::test]
    async fn operations_before_initialize_are_not_ready() {
        let h = harness(None);
        assert_eq!(h.session.state().await, AuthState::NotReady);
        assert_matches!(h.session.get_access_token().await, Err(AuthError::NotReady));
        assert_matches!(h.session.send_email_code("a@b.c").await, Err(AuthError::NotReady));
    }

    #[tokio::test]
    async fn initialize_without_stored_token_is_unauthenticated() {
        let h = harness(None);
        assert_eq!(h.session.initialize().await, AuthState::Unauthenticated);
        assert_eq!(h.backend.refreshes(), 0);
        assert_matches!(h.session.get_access_token().await, Err(AuthError::NotAuthenticated));
    }

    #[tokio::test]
    async fn initialize_restores_stored_session() {
        let h = harness(Some("stored-refresh"));
        assert_eq!(h.session.initialize().await, AuthState::Authenticated);
        assert_eq!(h.backend.refreshes(), 1);
        assert_eq!(h.session.user().await.unwrap().id, "did:privy:user");

        // The rotated refresh token is persisted with the configured lifetime.
        let stored = h.store.snapshot().unwrap();
        assert_eq!(stored.refresh_token.value, "refresh-1");
        assert_eq!(stored.refresh_token.expires_at, at(T0) + chrono::Duration::days(30));
    }

    #[tokio::test]
    async fn oversized_refresh_lifetime_is_capped_instead_of_overflowing() {
        let store = Arc::new(MemoryTokenStore::with_tokens(StoredTokens {
            refresh_token: Token::new("stored-refresh", at(T0 + 86_400)),
        }));
        let config = AuthConfig {
            refresh_token_lifetime: chrono::Duration::try_days(100_000_000).unwrap(),
            ..AuthConfig::new("app", "client")
        };
        let session = AuthSession::new(Arc::new(FakeBackend::new()), store.clone(), &config)
            .with_clock(Arc::new(ManualClock::new(at(T0))));

        assert_eq!(session.initialize().await, AuthState::Authenticated);
        let stored = store.snapshot().unwrap();
        assert_eq!(
            stored.refresh_token.expires_at,
            chrono::DateTime::<chrono::Utc>::MAX_UTC
        );
    }

    #[tokio::test]
    async fn unexpired_token_is_served_without_refresh() {
        let h = harness(Some("stored-refresh"));
        h.session.initialize().await;

        h.clock.advance(chrono::Duration::seconds(3600 - 31));
        h.session.get_access_token().await.unwrap();
        assert_eq!(h.backend.refreshes(), 1);
    }

    #[tokio::test]
    async fn token_inside_padding_window_refreshes_exactly_once() {
        let h = harness(Some("stored-refresh"));
        h.session.initialize().await;
        let first = h.session.get_access_token().await.unwrap();

        h.clock.advance(chrono::Duration::seconds(3600 - 10));
        *h.backend.next_exp.lock().unwrap() = T0 + 7200;

        let second = h.session.get_access_token().await.unwrap();
        let third = h.session.get_access_token().await.unwrap();
        assert_ne!(first, second);
        assert_eq!(second, third);
        assert_eq!(h.backend.refreshes(), 2);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let h = harness(Some("stored-refresh"));
        h.session.initialize().await;
        h.clock.advance(chrono::Duration::seconds(3600));
        *h.backend.next_exp.lock().unwrap() = T0 + 7200;

        let (a, b, c, d) = tokio::join!(
            h.session.get_access_token(),
            h.session.get_access_token(),
            h.session.get_access_token(),
            h.session.get_access_token(),
        );
        let tokens = [a.unwrap(), b.unwrap(), c.unwrap(), d.unwrap()];
        assert!(tokens.iter().all(|t| t == &tokens[0]));
        assert_eq!(h.backend.refreshes(), 2);
    }

    #[tokio::test]
    async fn forced_refresh_ignores_fresh_token() {
        let h = harness(Some("stored-refresh"));
        h.session.initialize().await;

        h.session.refresh_session(false).await.unwrap();
        assert_eq!(h.backend.refreshes(), 1);
        h.session.refresh_session(true).await.unwrap();
        assert_eq!(h.backend.refreshes(), 2);
    }

    #[tokio::test]
    async fn rejected_refresh_unauthenticates_and_clears_store() {
        let h = harness(Some("stored-refresh"));
        h.session.initialize().await;
        h.clock.advance(chrono::Duration::seconds(3600));
        h.backend.fail_refresh_with(401);

        assert_matches!(h.session.get_access_token().await, Err(AuthError::Authentication(_)));
        assert_eq!(h.session.state().await, AuthState::Unauthenticated);
        assert!(h.session.user().await.is_none());
        assert!(h.store.snapshot().is_none());
    }

    #[tokio::test]
    async fn server_error_on_refresh_keeps_stored_token() {
        let h = harness(Some("stored-refresh"));
        h.backend.fail_refresh_with(503);

        assert_eq!(h.session.initialize().await, AuthState::Unauthenticated);
        assert_eq!(h.store.snapshot().unwrap().refresh_token.value, "stored-refresh");
    }

    #[tokio::test]
    async fn expired_stored_refresh_token_is_discarded() {
        let h = harness(Some("stored-refresh"));
        h.clock.advance(chrono::Duration::days(2));

        assert_eq!(h.session.initialize().await, AuthState::Unauthenticated);
        assert_eq!(h.backend.refreshes(), 0);
        assert!(h.store.snapshot().is_none());
    }

    #[tokio::test]
    async fn email_login_authenticates() {
        let h = harness(None);
        h.session.initialize().await;
        h.session.send_email_code("a@b.c").await.unwrap();

        let user = h.session.login_with_email_code("a@b.c", "123456").await.unwrap();
        assert_eq!(user.id, "did:privy:user");
        assert!(h.session.is_authenticated().await);
        assert!(h.store.snapshot().is_some());
    }

    #[tokio::test]
    async fn oauth_login_checks_state() {
        let h = harness(None);
        h.session.initialize().await;

        assert_matches!(
            h.session.login_with_oauth_code("code", "state").await,
            Err(AuthError::OAuthNotStarted)
        );

        let url = h
            .session
            .oauth_authorization_url(OAuthProvider::Google, "walletlink://oauth")
            .await
            .unwrap();
        assert_eq!(url, "https://provider.test/authorize");
        assert_matches!(
            h.session.login_with_oauth_code("code", "forged").await,
            Err(AuthError::OAuthStateMismatch)
        );
        assert!(!h.session.is_authenticated().await);
    }

    #[tokio::test]
    async fn logout_clears_session_and_store() {
        let h = harness(Some("stored-refresh"));
        h.session.initialize().await;

        h.session.logout().await.unwrap();
        assert_eq!(h.session.state().await, AuthState::Unauthenticated);
        assert!(h.session.user().await.is_none());
        assert!(h.store.snapshot().is_none());
        assert_matches!(h.session.get_access_token().await, Err(AuthError::NotAuthenticated));
    }

    #[tokio::test]
    async fn callback_fires_on_transitions_and_last_registration_wins() {
        let h = harness(None);
        let first = Arc::new(std::sync::Mutex::new(Vec::new()));
        let second = Arc::new(std::sync::Mutex::new(Vec::new()));

        let sink = first.clone();
        h.session
            .set_auth_state_change_callback(move |state| sink.lock().unwrap().push(state));
        h.session.initialize().await;

        let sink = second.clone();
        h.session
            .set_auth_state_change_callback(move |state| sink.lock().unwrap().push(state));
        h.session.login_with_email_code("a@b.c", "123456").await.unwrap();
        h.session.logout().await.unwrap();

        assert_eq!(*first.lock().unwrap(), vec![AuthState::Unauthenticated]);
        assert_eq!(
            *second.lock().unwrap(),
            vec![AuthState::Authenticated, AuthState::Unauthenticated]
        );
    }
}
