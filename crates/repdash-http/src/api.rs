//! Authenticated request adapter.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use repdash_core::error::ApiError;
use repdash_core::{Error, LANDING_ROUTE, Navigator, Result};

use crate::http::{ApiRequest, HttpClient, is_unauthorized};
use crate::session::SessionManager;

/// Sends resource requests on behalf of a [`SessionManager`].
///
/// Every request carries the session's current access token. A 401 is
/// answered by one refresh and one replay of the request; if that does not
/// help the session is cleared, the navigator is sent to
/// [`LANDING_ROUTE`] and the original 401 is returned.
#[derive(Clone)]
pub struct ApiClient {
    session: SessionManager,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(session: SessionManager, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Send a request and decode the response body.
    ///
    /// # Errors
    ///
    /// Transport failures are returned as-is and never end the session.
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    pub async fn send<R: DeserializeOwned>(&self, mut request: ApiRequest) -> Result<R> {
        loop {
            let (token, epoch) = self.session.current_token();
            request.set_bearer(token.as_ref());

            let response = match self.session.http().execute(&request).await {
                Ok(response) => response,
                Err(e) => {
                    if e.is_transport() {
                        warn!(error = %e, "request failed without a response");
                    }
                    return Err(e);
                }
            };

            if !is_unauthorized(response.status()) {
                return HttpClient::decode(response).await;
            }

            let rejection = HttpClient::api_error(response).await;
            if request.is_retried() {
                warn!("request rejected again after refresh");
                return Err(self.end_session(rejection));
            }
            request.mark_retried();

            match self.session.refresh_after_rejection(epoch).await {
                Ok(Some(_)) => debug!("replaying request with renewed token"),
                Ok(None) => {
                    warn!("no token available after rejection");
                    return Err(self.end_session(rejection));
                }
                Err(e) => {
                    warn!(error = %e, "token refresh failed");
                    return Err(self.end_session(rejection));
                }
            }
        }
    }

    fn end_session(&self, rejection: ApiError) -> Error {
        if let Err(e) = self.session.clear_local() {
            warn!(error = %e, "could not clear persisted tokens");
        }
        self.navigator.navigate(LANDING_ROUTE);
        rejection.into()
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
