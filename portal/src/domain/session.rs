//! Admin session state machine and manager.
//!
//! The session is an explicit context object rather than ambient global
//! state. [`SessionState::apply`] is the pure transition function;
//! [`SessionManager`] drives it from storage and backend calls.
//!
//! ## Invariants
//! - [`SessionState::Authenticated`] is only reached after a successful
//!   verification of the stored token or a completed login.
//! - A failed or timed-out verification always clears the stored token.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::auth::{AuthToken, LoginCredentials};
use super::ports::{AuthGateway, BackendError, TokenStore, TokenStoreError};
use super::submission::status_failure_message;

/// Default bound on the startup verification call.
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the admin session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No token, or the token was not accepted.
    #[default]
    Anonymous,
    /// A stored token is being checked.
    Verifying,
    /// The backend accepted the token.
    Authenticated,
}

/// Inputs that move the session between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Storage held a token at startup.
    TokenFound,
    /// Storage held no token at startup.
    TokenMissing,
    /// The verification endpoint accepted the token.
    VerificationSucceeded,
    /// Verification failed, timed out or storage was unreadable.
    VerificationFailed,
    /// A login completed and its token was persisted.
    LoggedIn,
    /// The admin logged out.
    LoggedOut,
}

impl SessionState {
    /// Apply `event` and return the next state.
    ///
    /// A verification success only counts while [`SessionState::Verifying`];
    /// arriving in any other state it is ignored.
    ///
    /// # Examples
    /// ```
    /// use portal::domain::{SessionEvent, SessionState};
    ///
    /// let state = SessionState::Anonymous
    ///     .apply(SessionEvent::TokenFound)
    ///     .apply(SessionEvent::VerificationSucceeded);
    /// assert_eq!(state, SessionState::Authenticated);
    /// ```
    #[must_use]
    pub const fn apply(self, event: SessionEvent) -> Self {
        match (self, event) {
            (Self::Anonymous, SessionEvent::TokenFound) => Self::Verifying,
            (Self::Verifying, SessionEvent::VerificationSucceeded) => Self::Authenticated,
            (_, SessionEvent::LoggedIn) => Self::Authenticated,
            (_, SessionEvent::TokenMissing | SessionEvent::VerificationFailed)
            | (_, SessionEvent::LoggedOut) => Self::Anonymous,
            (state, SessionEvent::TokenFound | SessionEvent::VerificationSucceeded) => state,
        }
    }

    /// Whether admin-only views may render.
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

/// Why an admin login attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    /// The backend refused the credentials; carries its message.
    #[error("{message}")]
    Rejected {
        /// Message to show on the login form.
        message: String,
    },
    /// The backend could not be reached.
    #[error("Unable to reach the server. Please try again.")]
    Network {
        /// Transport diagnostic, for logs only.
        detail: String,
    },
    /// The login call exceeded its time budget.
    #[error("The server took too long to respond. Please try again.")]
    Timeout {
        /// Transport diagnostic, for logs only.
        detail: String,
    },
    /// The backend answered 2xx without a usable token.
    #[error("The server sent an unexpected response. Please try again.")]
    MalformedResponse {
        /// Decode diagnostic, for logs only.
        detail: String,
    },
    /// The token could not be persisted.
    #[error("Could not save your session. Please try again.")]
    Storage(#[from] TokenStoreError),
}

impl From<BackendError> for LoginError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Rejected { message, .. } => Self::Rejected { message },
            BackendError::Unparsed { status, .. } => Self::Rejected {
                message: status_failure_message(status),
            },
            BackendError::Transport { message } => Self::Network { detail: message },
            BackendError::Timeout { message } => Self::Timeout { detail: message },
            BackendError::Decode { message } => Self::MalformedResponse { detail: message },
        }
    }
}

/// Owns the persisted token and the current [`SessionState`].
pub struct SessionManager<S, A> {
    store: Arc<S>,
    gateway: Arc<A>,
    verify_timeout: Duration,
    state: SessionState,
}

impl<S, A> SessionManager<S, A> {
    /// Manager starting [`SessionState::Anonymous`] with the default timeout.
    pub fn new(store: Arc<S>, gateway: Arc<A>) -> Self {
        Self {
            store,
            gateway,
            verify_timeout: DEFAULT_VERIFY_TIMEOUT,
            state: SessionState::Anonymous,
        }
    }

    /// Override the bound applied to startup verification.
    #[must_use]
    pub fn with_verify_timeout(mut self, verify_timeout: Duration) -> Self {
        self.verify_timeout = verify_timeout;
        self
    }

    /// Current session state.
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Whether admin-only views may render.
    pub const fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    fn transition(&mut self, event: SessionEvent) {
        let next = self.state.apply(event);
        debug!(from = ?self.state, to = ?next, ?event, "session transition");
        self.state = next;
    }
}

impl<S, A> SessionManager<S, A>
where
    S: TokenStore,
    A: AuthGateway,
{
    /// Reconcile the stored token with the backend at startup.
    ///
    /// Failures are logged and resolve to [`SessionState::Anonymous`] with the
    /// stored token cleared; they are never returned to the caller.
    pub async fn bootstrap(&mut self) -> SessionState {
        let token = match self.store.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                self.transition(SessionEvent::TokenMissing);
                return self.state;
            }
            Err(error) => {
                warn!(error = %error, "stored session token unreadable");
                self.clear_stored_token();
                self.transition(SessionEvent::TokenMissing);
                return self.state;
            }
        };

        self.transition(SessionEvent::TokenFound);
        let outcome = tokio::time::timeout(self.verify_timeout, self.gateway.verify(&token)).await;
        match outcome {
            Ok(Ok(())) => {
                info!("stored session token verified");
                self.transition(SessionEvent::VerificationSucceeded);
            }
            Ok(Err(error)) => {
                warn!(error = %error, "session token verification failed");
                self.clear_stored_token();
                self.transition(SessionEvent::VerificationFailed);
            }
            Err(_elapsed) => {
                warn!(
                    timeout_ms = self.verify_timeout.as_millis(),
                    "session token verification timed out"
                );
                self.clear_stored_token();
                self.transition(SessionEvent::VerificationFailed);
            }
        }
        self.state
    }

    /// Persist `token` and become authenticated without re-verifying it.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError`] when persistence fails; the state is left
    /// unchanged in that case.
    pub fn login(&mut self, token: &AuthToken) -> Result<(), TokenStoreError> {
        self.store.save(token)?;
        self.transition(SessionEvent::LoggedIn);
        Ok(())
    }

    /// Exchange admin credentials for a token, then [`Self::login`].
    ///
    /// # Errors
    ///
    /// Returns [`LoginError`] describing the failed step. The state does not
    /// change on failure.
    pub async fn authenticate(&mut self, credentials: &LoginCredentials) -> Result<(), LoginError> {
        let token = self.gateway.login(credentials).await.map_err(|error| {
            warn!(error = %error, "admin login failed");
            LoginError::from(error)
        })?;
        self.login(&token)?;
        info!("admin logged in");
        Ok(())
    }

    /// Drop to [`SessionState::Anonymous`] and clear the stored token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError`] when the stored token could not be
    /// removed. The in-memory state is anonymous regardless.
    pub fn logout(&mut self) -> Result<(), TokenStoreError> {
        self.transition(SessionEvent::LoggedOut);
        self.store.clear()
    }

    fn clear_stored_token(&self) {
        if let Err(error) = self.store.clear() {
            warn!(error = %error, "failed to clear stored session token");
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{InMemoryTokenStore, MockAuthGateway, MockTokenStore};
    use async_trait::async_trait;
    use rstest::rstest;
    use std::time::Instant;

    fn token(raw: &str) -> AuthToken {
        AuthToken::new(raw).expect("valid token")
    }

    fn manager(
        store: InMemoryTokenStore,
        gateway: MockAuthGateway,
    ) -> SessionManager<InMemoryTokenStore, MockAuthGateway> {
        SessionManager::new(Arc::new(store), Arc::new(gateway))
    }

    #[rstest]
    #[case(SessionState::Anonymous, SessionEvent::TokenFound, SessionState::Verifying)]
    #[case(SessionState::Verifying, SessionEvent::VerificationSucceeded, SessionState::Authenticated)]
    #[case(SessionState::Verifying, SessionEvent::VerificationFailed, SessionState::Anonymous)]
    #[case(SessionState::Anonymous, SessionEvent::VerificationSucceeded, SessionState::Anonymous)]
    #[case(SessionState::Anonymous, SessionEvent::LoggedIn, SessionState::Authenticated)]
    #[case(SessionState::Verifying, SessionEvent::LoggedIn, SessionState::Authenticated)]
    #[case(SessionState::Authenticated, SessionEvent::LoggedOut, SessionState::Anonymous)]
    #[case(SessionState::Verifying, SessionEvent::LoggedOut, SessionState::Anonymous)]
    #[case(SessionState::Authenticated, SessionEvent::VerificationFailed, SessionState::Anonymous)]
    #[case(SessionState::Authenticated, SessionEvent::TokenFound, SessionState::Authenticated)]
    #[case(SessionState::Verifying, SessionEvent::TokenMissing, SessionState::Anonymous)]
    fn transitions(
        #[case] from: SessionState,
        #[case] event: SessionEvent,
        #[case] expected: SessionState,
    ) {
        assert_eq!(from.apply(event), expected);
    }

    #[tokio::test]
    async fn bootstrap_without_a_token_skips_verification() {
        let mut gateway = MockAuthGateway::new();
        gateway.expect_verify().times(0);
        let mut session = manager(InMemoryTokenStore::default(), gateway);

        assert_eq!(session.bootstrap().await, SessionState::Anonymous);
    }

    #[tokio::test]
    async fn bootstrap_authenticates_a_verified_token() {
        let mut gateway = MockAuthGateway::new();
        gateway
            .expect_verify()
            .withf(|candidate| candidate.expose() == "stored")
            .times(1)
            .return_once(|_| Ok(()));
        let store = Arc::new(InMemoryTokenStore::with_token(token("stored")));
        let mut session = SessionManager::new(Arc::clone(&store), Arc::new(gateway));

        assert_eq!(session.bootstrap().await, SessionState::Authenticated);
        assert_eq!(store.load().expect("load"), Some(token("stored")));
    }

    #[rstest]
    #[case(BackendError::rejected(401_u16, "expired", None::<String>))]
    #[case(BackendError::transport("connection refused"))]
    #[case(BackendError::decode("garbage"))]
    #[tokio::test]
    async fn bootstrap_clears_rejected_tokens(#[case] failure: BackendError) {
        let mut gateway = MockAuthGateway::new();
        gateway
            .expect_verify()
            .times(1)
            .return_once(move |_| Err(failure));
        let store = Arc::new(InMemoryTokenStore::with_token(token("stale")));
        let mut session = SessionManager::new(Arc::clone(&store), Arc::new(gateway));

        assert_eq!(session.bootstrap().await, SessionState::Anonymous);
        assert_eq!(store.load().expect("load"), None);
    }

    struct StalledGateway;

    #[async_trait]
    impl AuthGateway for StalledGateway {
        async fn login(&self, _credentials: &LoginCredentials) -> Result<AuthToken, BackendError> {
            Err(BackendError::transport("not used"))
        }

        async fn verify(&self, _token: &AuthToken) -> Result<(), BackendError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn bootstrap_treats_timeouts_as_failures() {
        let store = Arc::new(InMemoryTokenStore::with_token(token("slow")));
        let bound = Duration::from_millis(50);
        let mut session = SessionManager::new(Arc::clone(&store), Arc::new(StalledGateway))
            .with_verify_timeout(bound);

        let started = Instant::now();
        assert_eq!(session.bootstrap().await, SessionState::Anonymous);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(store.load().expect("load"), None);
    }

    #[tokio::test]
    async fn unreadable_storage_resolves_to_anonymous() {
        let mut store = MockTokenStore::new();
        store
            .expect_load()
            .times(1)
            .return_once(|| Err(TokenStoreError::corrupt("not utf-8")));
        store.expect_clear().times(1).return_once(|| Ok(()));
        let mut gateway = MockAuthGateway::new();
        gateway.expect_verify().times(0);
        let mut session = SessionManager::new(Arc::new(store), Arc::new(gateway));

        assert_eq!(session.bootstrap().await, SessionState::Anonymous);
    }

    #[test]
    fn login_authenticates_without_any_network_call() {
        let mut gateway = MockAuthGateway::new();
        gateway.expect_verify().times(0);
        gateway.expect_login().times(0);
        let mut session = manager(InMemoryTokenStore::default(), gateway);

        session.login(&token("fresh")).expect("login");
        assert!(session.is_authenticated());
    }

    #[test]
    fn failed_persistence_keeps_the_session_anonymous() {
        let mut store = MockTokenStore::new();
        store
            .expect_save()
            .times(1)
            .return_once(|_| Err(TokenStoreError::io("disk full")));
        let mut session = SessionManager::new(Arc::new(store), Arc::new(MockAuthGateway::new()));

        session.login(&token("fresh")).expect_err("save fails");
        assert_eq!(session.state(), SessionState::Anonymous);
    }

    #[test]
    fn logout_clears_storage_and_state() {
        let store = Arc::new(InMemoryTokenStore::default());
        let mut session = SessionManager::new(Arc::clone(&store), Arc::new(MockAuthGateway::new()));
        session.login(&token("fresh")).expect("login");

        session.logout().expect("logout");
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(store.load().expect("load"), None);
    }

    #[tokio::test]
    async fn authenticate_persists_the_issued_token() {
        let mut gateway = MockAuthGateway::new();
        gateway
            .expect_login()
            .withf(|creds| creds.email() == "admin@gym.test")
            .times(1)
            .return_once(|_| Ok(AuthToken::new("issued").expect("valid token")));
        gateway.expect_verify().times(0);
        let store = Arc::new(InMemoryTokenStore::default());
        let mut session = SessionManager::new(Arc::clone(&store), Arc::new(gateway));
        let creds = LoginCredentials::try_from_parts("admin@gym.test", "pw").expect("creds");

        session.authenticate(&creds).await.expect("login succeeds");
        assert!(session.is_authenticated());
        assert_eq!(store.load().expect("load"), Some(token("issued")));
    }

    #[rstest]
    #[case(
        BackendError::rejected(401_u16, "Invalid credentials", None::<String>),
        LoginError::Rejected { message: "Invalid credentials".to_owned() }
    )]
    #[case(
        BackendError::unparsed(502_u16, "<html>Bad Gateway</html>"),
        LoginError::Rejected { message: "Request failed with status 502".to_owned() }
    )]
    #[case(
        BackendError::timeout("deadline"),
        LoginError::Timeout { detail: "deadline".to_owned() }
    )]
    #[case(
        BackendError::decode("missing token"),
        LoginError::MalformedResponse { detail: "missing token".to_owned() }
    )]
    #[tokio::test]
    async fn authenticate_failures_leave_the_session_anonymous(
        #[case] failure: BackendError,
        #[case] expected: LoginError,
    ) {
        let mut gateway = MockAuthGateway::new();
        gateway
            .expect_login()
            .times(1)
            .return_once(move |_| Err(failure));
        let store = Arc::new(InMemoryTokenStore::default());
        let mut session = SessionManager::new(Arc::clone(&store), Arc::new(gateway));
        let creds = LoginCredentials::try_from_parts("admin@gym.test", "pw").expect("creds");

        let error = session.authenticate(&creds).await.expect_err("login fails");
        assert_eq!(error, expected);
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(store.load().expect("load"), None);
    }
}
