//! HTTP transport for the reporting API.

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, trace};

use repdash_core::error::{ApiError, DecodeError, Error, InvalidInputError, TransportError};
use repdash_core::{AccessToken, ApiUrl, Result};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint path is joined onto.
    pub base_url: ApiUrl,
    /// Per-request timeout; `None` disables it.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: ApiUrl::default(),
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: concat!("repdash/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Request body variants the backend accepts.
#[derive(Clone)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// `application/x-www-form-urlencoded` fields.
    Form(Vec<(String, String)>),
}

/// A request that can be dispatched, and re-dispatched, by [`HttpClient`].
#[derive(Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
    authorization: Option<String>,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            authorization: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| InvalidInputError::Field {
            field: "body",
            reason: e.to_string(),
        })?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    /// Attach a form-encoded body.
    pub fn form<'a>(mut self, fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        self.body = RequestBody::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    /// Append query string parameters.
    pub fn query(mut self, params: Vec<(String, String)>) -> Self {
        self.query.extend(params);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether this request has already been replayed after a refresh.
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }

    /// Override the `Authorization` header for this request only.
    pub(crate) fn set_bearer(&mut self, token: Option<&AccessToken>) {
        self.authorization = token.map(AccessToken::bearer);
    }

    pub(crate) fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }
}

// Bodies may carry passwords and the header carries a token.
impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match self.body {
            RequestBody::Empty => "empty",
            RequestBody::Json(_) => "json",
            RequestBody::Form(_) => "form",
        };
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("body", &body)
            .field("authorized", &self.authorization.is_some())
            .field("retried", &self.retried)
            .finish()
    }
}

/// HTTP client for the reporting API.
///
/// Holds the default headers every request starts from. The session
/// manager keeps the `Authorization` entry in step with its access token.
/// Clones share the connection pool and the default headers.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: ApiUrl,
    default_headers: Arc<RwLock<HeaderMap>>,
}

impl HttpClient {
    /// Create a new client from its configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(transport_error)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            default_headers: Arc::new(RwLock::new(headers)),
        })
    }

    /// Returns the API base URL this client is configured for.
    pub fn base_url(&self) -> &ApiUrl {
        &self.base_url
    }

    /// Set or clear the default `Authorization` header.
    pub fn set_bearer(&self, token: Option<&AccessToken>) -> Result<()> {
        let mut headers = self.write_headers();
        match token {
            Some(token) => {
                let mut value = HeaderValue::from_str(&token.bearer())
                    .map_err(|_| InvalidInputError::HeaderValue)?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            None => {
                headers.remove(AUTHORIZATION);
            }
        }
        Ok(())
    }

    /// Returns the default `Authorization` header value, if set.
    pub fn bearer(&self) -> Option<String> {
        self.read_headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Dispatch a request and return the raw response, whatever its status.
    ///
    /// Only failures without a response are errors here.
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    pub async fn execute(&self, request: &ApiRequest) -> Result<reqwest::Response> {
        let url = self.base_url.endpoint(request.path());
        debug!(retried = request.is_retried(), "dispatching request");

        let mut headers = self.read_headers().clone();
        if let Some(authorization) = request.authorization() {
            let mut value =
                HeaderValue::from_str(authorization).map_err(|_| InvalidInputError::HeaderValue)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = self.client.request(request.method().clone(), &url).headers(headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Form(fields) => builder.form(fields),
        };

        let response = builder.send().await.map_err(transport_error)?;
        trace!(status = %response.status(), "response received");
        Ok(response)
    }

    /// Dispatch a request and decode a successful body.
    pub async fn send<R: DeserializeOwned>(&self, request: &ApiRequest) -> Result<R> {
        let response = self.execute(request).await?;
        Self::decode(response).await
    }

    /// Decode a response, turning non-success statuses into [`ApiError`].
    ///
    /// An empty success body decodes as JSON `null`.
    pub async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::api_error(response).await.into());
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };

        serde_json::from_slice(bytes).map_err(|e| {
            DecodeError::Body {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Build an [`ApiError`] from a non-success response.
    ///
    /// The backend reports failures as `{"detail": ...}`; validation
    /// failures carry a list there, which is kept as JSON text.
    pub async fn api_error(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();

        let detail = match response.json::<Value>().await {
            Ok(Value::Object(body)) => match body.get("detail").or_else(|| body.get("message")) {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            },
            _ => None,
        };

        ApiError::new(status, detail)
    }

    fn read_headers(&self) -> RwLockReadGuard<'_, HeaderMap> {
        self.default_headers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_headers(&self) -> RwLockWriteGuard<'_, HeaderMap> {
        self.default_headers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Returns true for the status that triggers refresh-and-retry.
pub(crate) fn is_unauthorized(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED
}

/// Map a reqwest failure (no usable response) onto the error taxonomy.
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let message = err.to_string();
    let err = if err.is_timeout() {
        TransportError::Timeout { message }
    } else if err.is_connect() {
        TransportError::Connection { message }
    } else {
        TransportError::Http { message }
    };
    Error::Transport(err)
}
