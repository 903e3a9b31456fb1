//! Session management for the reporting API.

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use repdash_core::tokens::refresh_delay;
use repdash_core::{
    AccessToken, Claims, Credentials, Error, RefreshToken, Result, StorageKey, TokenStore,
};

use crate::http::endpoints::{
    LOGIN, LOGOUT, REFRESH, RefreshTokenBody, SIGNUP, extract_access_token, extract_refresh_token,
};
use crate::http::{ApiRequest, HttpClient};
use crate::timer::RefreshTimer;

/// Refresh this long before the access token expires.
pub const DEFAULT_REFRESH_LEEWAY: Duration = Duration::from_secs(60);

/// Never schedule a refresh sooner than this from now.
pub const DEFAULT_MIN_REFRESH_DELAY: Duration = Duration::from_secs(5);

/// Proactive refresh timing.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub refresh_leeway: Duration,
    pub min_refresh_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_leeway: DEFAULT_REFRESH_LEEWAY,
            min_refresh_delay: DEFAULT_MIN_REFRESH_DELAY,
        }
    }
}

/// Whether the session currently holds an access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Anonymous,
    Authenticated,
}

/// How a logout went on the server side.
///
/// The local session is cleared in every case.
#[derive(Debug)]
pub enum LogoutOutcome {
    /// The backend revoked the refresh token.
    Notified,
    /// There was no refresh token, so the backend was not contacted.
    NoRefreshToken,
    /// The backend could not be notified. The error is non-fatal.
    LocalOnly { reason: Error },
}

impl LogoutOutcome {
    pub fn server_notified(&self) -> bool {
        matches!(self, LogoutOutcome::Notified)
    }

    /// The swallowed error, if the backend could not be notified.
    pub fn non_fatal_error(&self) -> Option<&Error> {
        match self {
            LogoutOutcome::LocalOnly { reason } => Some(reason),
            _ => None,
        }
    }
}

/// The authenticated session shared by every request.
///
/// Owns the current tokens, keeps the transport's default
/// `Authorization` header in step with the access token, persists tokens
/// through a [`TokenStore`] and renews the access token shortly before it
/// expires.
///
/// # Thread Safety
///
/// Sessions are cheap to clone (they use internal `Arc`) and are safe to
/// share across tasks. Refreshes are serialised: at most one refresh
/// request is in flight per session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    http: HttpClient,
    store: Arc<dyn TokenStore>,
    config: SessionConfig,
    state: RwLock<SessionState>,
    timer: RefreshTimer,
    refresh_lock: tokio::sync::Mutex<()>,
}

#[derive(Default)]
struct SessionState {
    access_token: Option<AccessToken>,
    refresh_token: Option<RefreshToken>,
    authenticated: bool,
    /// Bumped on every token change, including clears.
    epoch: u64,
}

impl SessionManager {
    /// Create an anonymous session. Call [`initialize`](Self::initialize)
    /// to pick up persisted tokens.
    pub fn new(http: HttpClient, store: Arc<dyn TokenStore>, config: SessionConfig) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                http,
                store,
                config,
                state: RwLock::new(SessionState::default()),
                timer: RefreshTimer::new(),
                refresh_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Restore the session from the token store.
    ///
    /// Makes no network call. Calling it again re-reads the store and
    /// leaves exactly one refresh timer armed.
    #[instrument(skip(self))]
    pub fn initialize(&self) -> Result<SessionStatus> {
        let access = self
            .inner
            .store
            .get(StorageKey::AccessToken)?
            .filter(|t| !t.is_empty())
            .map(AccessToken::new);
        let refresh = self
            .inner
            .store
            .get(StorageKey::RefreshToken)?
            .filter(|t| !t.is_empty())
            .map(RefreshToken::new);

        let Some(token) = access else {
            self.write_state().refresh_token = refresh;
            debug!("no persisted access token");
            return Ok(SessionStatus::Anonymous);
        };

        self.install(token.clone(), refresh)?;
        self.schedule(&token);
        info!("session restored");
        Ok(SessionStatus::Authenticated)
    }

    /// Adopt a new access token.
    ///
    /// Stores it in memory and in the token store, updates the default
    /// `Authorization` header and re-arms proactive refresh from the
    /// token's `exp` claim. A token without a readable expiry is kept but
    /// not scheduled.
    ///
    /// # Errors
    ///
    /// Fails if the token cannot be sent as a header value or the store
    /// cannot be written.
    #[instrument(skip(self, token))]
    pub fn set_token(&self, token: &str) -> Result<()> {
        let token = AccessToken::new(token);
        let refresh = self.read_state().refresh_token.clone();
        self.install(token.clone(), refresh)?;
        self.inner.store.set(StorageKey::AccessToken, token.as_str())?;
        self.schedule(&token);
        Ok(())
    }

    /// Exchange credentials for tokens.
    ///
    /// The credentials are sent form-encoded as `username`/`password`.
    /// Returns the raw response body.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Value> {
        let request = ApiRequest::post(LOGIN).form(credentials.form_fields());
        let body: Value = self.inner.http.send(&request).await?;

        let access = body
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty());

        match access {
            Some(access) => {
                if let Some(refresh) = extract_refresh_token(&body) {
                    self.store_refresh_token(refresh)?;
                }
                self.set_token(access)?;
                info!("logged in");
            }
            None => warn!("login response carried no access token"),
        }

        Ok(body)
    }

    /// Register an account. Returns the raw response body.
    #[instrument(skip(self, payload))]
    pub async fn signup<T: Serialize + ?Sized>(&self, payload: &T) -> Result<Value> {
        let request = ApiRequest::post(SIGNUP).json(payload)?;
        let body = self.inner.http.send(&request).await?;
        info!("account registered");
        Ok(body)
    }

    /// Renew the access token with the persisted refresh token.
    ///
    /// Returns `Ok(None)` without any network call when there is no
    /// refresh token, and also when the session changed (logout or a new
    /// login) while the request was in flight; the late response is
    /// discarded. Otherwise returns the raw response body. The token is
    /// adopted only if the body carries one, along with any rotated
    /// `refresh_token`.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Option<Value>> {
        let _guard = self.inner.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Best-effort server-side logout, then unconditional local clear.
    ///
    /// # Errors
    ///
    /// Only a token store failure is returned, after the in-memory session
    /// has been cleared. Backend failures are reported through
    /// [`LogoutOutcome::LocalOnly`].
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<LogoutOutcome> {
        let outcome = match self.stored_refresh_token() {
            None => LogoutOutcome::NoRefreshToken,
            Some(refresh) => match self.notify_logout(&refresh).await {
                Ok(()) => LogoutOutcome::Notified,
                Err(e) => {
                    warn!(error = %e, "logout notification failed, clearing local session anyway");
                    LogoutOutcome::LocalOnly { reason: e }
                }
            },
        };

        self.clear_local()?;
        info!(notified = outcome.server_notified(), "logged out");
        Ok(outcome)
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        if self.read_state().authenticated {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Anonymous
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::Authenticated
    }

    /// The in-memory access token.
    pub fn access_token(&self) -> Option<AccessToken> {
        self.read_state().access_token.clone()
    }

    /// The in-memory refresh token.
    pub fn refresh_token(&self) -> Option<RefreshToken> {
        self.read_state().refresh_token.clone()
    }

    /// Claims of the current access token, if it is a readable JWT.
    pub fn claims(&self) -> Option<Claims> {
        self.read_state()
            .access_token
            .as_ref()
            .and_then(|t| t.claims().ok())
    }

    /// Time until the proactive refresh fires, if one is armed.
    pub fn next_refresh_in(&self) -> Option<Duration> {
        self.inner.timer.remaining()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// The transport this session authenticates.
    pub fn http(&self) -> &HttpClient {
        &self.inner.http
    }

    /// The token for an outgoing request and the epoch it belongs to.
    ///
    /// Falls back to the token store when memory holds none.
    pub(crate) fn current_token(&self) -> (Option<AccessToken>, u64) {
        let (token, epoch) = {
            let state = self.read_state();
            (state.access_token.clone(), state.epoch)
        };
        if token.is_some() {
            return (token, epoch);
        }

        let stored = match self.inner.store.get(StorageKey::AccessToken) {
            Ok(stored) => stored.filter(|t| !t.is_empty()).map(AccessToken::new),
            Err(e) => {
                warn!(error = %e, "could not read access token from store");
                None
            }
        };
        (stored, epoch)
    }

    /// Refresh after a request dispatched at `seen_epoch` was rejected.
    ///
    /// If the token already changed since then, no request is made and
    /// the current token is returned. Returns `Ok(None)` when no usable
    /// token could be obtained.
    pub(crate) async fn refresh_after_rejection(
        &self,
        seen_epoch: u64,
    ) -> Result<Option<AccessToken>> {
        let _guard = self.inner.refresh_lock.lock().await;

        if self.read_state().epoch != seen_epoch {
            debug!("token changed since the request was sent, reusing it");
            return Ok(self.access_token());
        }

        self.refresh_locked().await?;
        if self.read_state().epoch == seen_epoch {
            debug!("refresh produced no new token");
            return Ok(None);
        }
        Ok(self.access_token())
    }

    /// Drop every token from memory and the store and stop the timer.
    pub(crate) fn clear_local(&self) -> Result<()> {
        {
            let mut state = self.write_state();
            self.inner.http.set_bearer(None)?;
            state.access_token = None;
            state.refresh_token = None;
            state.authenticated = false;
            state.epoch += 1;
        }
        self.inner.timer.cancel();
        self.inner.store.clear()
    }

    async fn refresh_locked(&self) -> Result<Option<Value>> {
        let Some(refresh) = self.stored_refresh_token() else {
            debug!("no refresh token, skipping refresh");
            return Ok(None);
        };

        let epoch = self.read_state().epoch;
        let request = ApiRequest::post(REFRESH).json(&RefreshTokenBody {
            refresh_token: refresh.as_str(),
        })?;
        let body: Value = self.inner.http.send(&request).await?;

        if self.read_state().epoch != epoch {
            info!("session changed during refresh, discarding response");
            return Ok(None);
        }

        let Some(access) = extract_access_token(&body) else {
            warn!("refresh response carried no access token");
            return Ok(Some(body));
        };
        if let Some(rotated) = extract_refresh_token(&body) {
            self.store_refresh_token(rotated)?;
        }
        self.set_token(access)?;

        info!("access token refreshed");
        Ok(Some(body))
    }

    async fn notify_logout(&self, refresh: &RefreshToken) -> Result<()> {
        let request = ApiRequest::post(LOGOUT).json(&RefreshTokenBody {
            refresh_token: refresh.as_str(),
        })?;
        let response = self.inner.http.execute(&request).await?;
        if !response.status().is_success() {
            return Err(HttpClient::api_error(response).await.into());
        }
        Ok(())
    }

    /// Refresh on behalf of a timer armed at `armed_epoch`.
    ///
    /// Skipped when the token changed while the task waited for the lock.
    async fn run_scheduled_refresh(&self, armed_epoch: u64) {
        let _guard = self.inner.refresh_lock.lock().await;
        if self.read_state().epoch != armed_epoch {
            debug!("token changed since refresh was scheduled, skipping");
            return;
        }

        match self.refresh_locked().await {
            Ok(Some(_)) => debug!("scheduled refresh completed"),
            Ok(None) => debug!("scheduled refresh skipped"),
            Err(e) => warn!(error = %e, "scheduled refresh failed"),
        }
    }

    /// Update memory and the default header together.
    fn install(&self, token: AccessToken, refresh: Option<RefreshToken>) -> Result<()> {
        let mut state = self.write_state();
        self.inner.http.set_bearer(Some(&token))?;
        state.access_token = Some(token);
        state.refresh_token = refresh;
        state.authenticated = true;
        state.epoch += 1;
        Ok(())
    }

    fn schedule(&self, token: &AccessToken) {
        let claims = match token.claims() {
            Ok(claims) => claims,
            Err(e) => {
                warn!(error = %e, "access token has no readable expiry, proactive refresh disabled");
                self.inner.timer.cancel();
                return;
            }
        };

        let now_ms = chrono::Utc::now().timestamp_millis();
        let delay = refresh_delay(
            &claims,
            now_ms,
            self.inner.config.refresh_leeway,
            self.inner.config.min_refresh_delay,
        );

        let epoch = self.read_state().epoch;
        let weak = Arc::downgrade(&self.inner);
        let armed = self.inner.timer.arm(delay, move |id| async move {
            if let Some(inner) = weak.upgrade() {
                inner.timer.detach(id);
                SessionManager { inner }.run_scheduled_refresh(epoch).await;
            }
        });
        if armed {
            debug!(delay_ms = delay.as_millis() as u64, "refresh scheduled");
        }
    }

    fn store_refresh_token(&self, refresh: &str) -> Result<()> {
        self.inner.store.set(StorageKey::RefreshToken, refresh)?;
        self.write_state().refresh_token = Some(RefreshToken::new(refresh));
        Ok(())
    }

    /// The persisted refresh token, falling back to memory.
    fn stored_refresh_token(&self) -> Option<RefreshToken> {
        match self.inner.store.get(StorageKey::RefreshToken) {
            Ok(Some(token)) if !token.is_empty() => Some(RefreshToken::new(token)),
            Ok(_) => self.refresh_token(),
            Err(e) => {
                warn!(error = %e, "could not read refresh token from store");
                self.refresh_token()
            }
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// Hide tokens in Debug output
impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("api", &self.inner.http.base_url().as_str())
            .field("status", &self.status())
            .field("refresh_armed", &self.inner.timer.is_armed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repdash_core::MemoryTokenStore;

    use crate::http::ClientConfig;

    fn session(store: MemoryTokenStore) -> SessionManager {
        let http = HttpClient::new(&ClientConfig::default()).unwrap();
        SessionManager::new(http, Arc::new(store), SessionConfig::default())
    }

    #[test]
    fn new_session_is_anonymous() {
        let session = session(MemoryTokenStore::new());
        assert_eq!(session.status(), SessionStatus::Anonymous);
        assert!(session.access_token().is_none());
        assert!(session.http().bearer().is_none());
        assert!(session.next_refresh_in().is_none());
    }

    #[test]
    fn initialize_without_runtime_restores_but_does_not_schedule() {
        let store = MemoryTokenStore::with_tokens(Some("not-a-jwt"), Some("r"));
        let session = session(store);

        assert_eq!(session.initialize().unwrap(), SessionStatus::Authenticated);
        assert_eq!(session.http().bearer().as_deref(), Some("Bearer not-a-jwt"));
        assert_eq!(session.refresh_token().unwrap().as_str(), "r");
        assert!(session.next_refresh_in().is_none());
    }

    #[test]
    fn clear_local_drops_everything() {
        let store = Arc::new(MemoryTokenStore::with_tokens(Some("a.b.c"), Some("r")));
        let http = HttpClient::new(&ClientConfig::default()).unwrap();
        let session = SessionManager::new(http, store.clone(), SessionConfig::default());
        session.initialize().unwrap();

        session.clear_local().unwrap();
        assert_eq!(session.status(), SessionStatus::Anonymous);
        assert!(session.http().bearer().is_none());
        assert_eq!(store.get(StorageKey::AccessToken).unwrap(), None);
        assert_eq!(store.get(StorageKey::RefreshToken).unwrap(), None);
    }

    #[test]
    fn epoch_moves_on_every_token_change() {
        let session = session(MemoryTokenStore::new());
        let (_, start) = session.current_token();
        session.set_token("x.y.z").unwrap();
        let (token, after_set) = session.current_token();
        assert_eq!(token.unwrap().as_str(), "x.y.z");
        assert!(after_set > start);

        session.clear_local().unwrap();
        let (token, after_clear) = session.current_token();
        assert!(token.is_none());
        assert!(after_clear > after_set);
    }

    #[test]
    fn logout_outcome_accessors() {
        assert!(LogoutOutcome::Notified.server_notified());
        assert!(LogoutOutcome::NoRefreshToken.non_fatal_error().is_none());

        let outcome = LogoutOutcome::LocalOnly {
            reason: repdash_core::error::ApiError::new(500, None).into(),
        };
        assert!(!outcome.server_notified());
        assert_eq!(outcome.non_fatal_error().and_then(Error::status), Some(500));
    }

    #[test]
    fn debug_hides_tokens() {
        let session = session(MemoryTokenStore::with_tokens(Some("secret.jwt.value"), None));
        session.initialize().unwrap();
        let debug = format!("{:?}", session);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("Authenticated"));
    }
}
