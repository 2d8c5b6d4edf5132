//! Request execution.
//!
//! [`Session`] is the single path every API call takes: it injects the bearer
//! token, maps failed statuses onto [`Error`], and on a `401` re-authenticates
//! and retries the request exactly once when password credentials exist.
//! [`ServiceClient`] binds a session to one logical service and provides the
//! JSON helpers used by the resource crates.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{Client, ClientBuilder, Method, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::auth::{Credentials, TokenManager};
use crate::config::ConohaConfig;
use crate::endpoint::{EndpointResolver, Service};
use crate::error::{extract_message, Error, Result};

/// Header carrying the bearer token
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Connect timeout applied to the shared HTTP client, in seconds
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

const USER_AGENT: &str = concat!("conoha-rust/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by the token manager and every service.
///
/// # Errors
///
/// Returns [`Error::ConfigError`] if the TLS backend cannot be initialised.
pub fn build_http_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT))
        .build()
        .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))
}

/// Request payload.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// JSON document
    Json(Value),
    /// Raw bytes, sent as-is
    Raw(Bytes),
}

/// A fully described HTTP request, replayable for the auth retry.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    url: String,
    query: Vec<(&'static str, String)>,
    headers: HeaderMap,
    body: Option<RequestBody>,
    timeout: Option<Duration>,
}

impl ApiRequest {
    /// Create a request for `method` against an absolute URL.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// Append query parameters.
    #[must_use]
    pub fn with_query(mut self, params: Vec<(&'static str, String)>) -> Self {
        self.query.extend(params);
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseError`] if the payload cannot be serialized.
    pub fn with_json<B>(mut self, body: &B) -> Result<Self>
    where
        B: Serialize + ?Sized,
    {
        self.body = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    /// Attach a raw body.
    #[must_use]
    pub fn with_bytes(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(RequestBody::Raw(body.into()));
        self
    }

    /// Set a header; caller headers replace the defaults of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] for an illegal header name or value.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| Error::InvalidRequest(format!("Invalid header name `{name}`: {err}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|err| Error::InvalidRequest(format!("Invalid value for `{name}`: {err}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Override the per-attempt timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Target URL without query string.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Shared state for issuing authenticated requests.
#[derive(Debug, Clone)]
pub struct Session {
    http: Client,
    tokens: Arc<TokenManager>,
    timeout: Duration,
}

impl Session {
    /// Create a session.
    #[must_use]
    pub fn new(http: Client, tokens: Arc<TokenManager>, timeout: Duration) -> Self {
        Self {
            http,
            tokens,
            timeout,
        }
    }

    /// Build a session from configuration, credentials and pre-loaded
    /// environment overrides. No request is sent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for invalid configuration.
    pub fn from_config(
        config: &ConohaConfig,
        credentials: Credentials,
        environment: HashMap<String, String>,
    ) -> Result<Self> {
        config.check()?;
        let timeout = config.timeout();
        let http = build_http_client(timeout)?;
        let endpoints = Arc::new(EndpointResolver::new(
            config.region.clone(),
            config.endpoints.clone(),
            environment,
        ));
        let tokens = Arc::new(TokenManager::new(
            http.clone(),
            credentials,
            endpoints,
            timeout,
        ));
        Ok(Self::new(http, tokens, timeout))
    }

    /// Token manager backing this session.
    #[must_use]
    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// Endpoint resolver backing this session.
    #[must_use]
    pub fn endpoints(&self) -> &Arc<EndpointResolver> {
        self.tokens.endpoints()
    }

    /// Default timeout for each attempt.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute a request and return the successful response.
    ///
    /// A `401` triggers one re-authentication and one retry when the token
    /// can be refreshed. Any failure of the retry is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`Error`] for statuses at or above 400, or a
    /// transport error.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Response> {
        let token = self.tokens.valid_token().await?;
        let response = self.send_once(request, &token, 1).await?;

        if response.status() != StatusCode::UNAUTHORIZED || !self.tokens.can_refresh() {
            return check_status(response).await;
        }

        warn!(
            method = %request.method,
            url = %request.url,
            "request unauthorized, re-authenticating and retrying once"
        );
        let token = self.tokens.authenticate().await?;
        let response = self.send_once(request, &token, 2).await?;
        check_status(response).await
    }

    async fn send_once(
        &self,
        request: &ApiRequest,
        token: &SecretString,
        attempt: u32,
    ) -> Result<Response> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(token.expose_secret())
            .map_err(|err| Error::Authentication(format!("Token is not a valid header: {err}")))?;
        auth.set_sensitive(true);
        headers.insert(HeaderName::from_static(AUTH_TOKEN_HEADER), auth);
        for (name, value) in &request.headers {
            headers.insert(name.clone(), value.clone());
        }

        let mut builder = self
            .http
            .request(request.method.clone(), &request.url)
            .timeout(request.timeout.unwrap_or(self.timeout))
            .headers(headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match &request.body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Raw(bytes)) => builder.body(bytes.clone()),
            None => builder,
        };

        debug!(method = %request.method, url = %request.url, attempt, "ConoHa request");
        Ok(builder.send().await?)
    }
}

/// Pass through responses below 400, map the rest onto [`Error`].
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.as_u16() < 400 {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = extract_message(status, &text);
    debug!(status = status.as_u16(), %message, "ConoHa request failed");
    let body = (!text.is_empty()).then_some(text);
    Err(Error::from_status(status.as_u16(), message, body))
}

/// Serializes `value` as `{ key: value }`.
#[derive(Debug)]
pub struct Wrapped<'a, T: ?Sized> {
    key: &'static str,
    value: &'a T,
}

/// Wrap a request body under a top-level key.
#[must_use]
pub fn wrap<'a, T: ?Sized>(key: &'static str, value: &'a T) -> Wrapped<'a, T> {
    Wrapped { key, value }
}

impl<T> Serialize for Wrapped<'_, T>
where
    T: Serialize + ?Sized,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key, self.value)?;
        map.end()
    }
}

/// Deserialize the value under `key` of a JSON document.
///
/// # Errors
///
/// Returns [`Error::ParseError`] if the key is missing or has the wrong shape.
pub fn take_key<R>(mut document: Value, key: &str) -> Result<R>
where
    R: DeserializeOwned,
{
    let value = document
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| Error::ParseError(format!("response is missing `{key}`")))?;
    serde_json::from_value(value).map_err(Error::from)
}

/// Handle for one logical service.
///
/// The base URL is resolved on every call so a catalog refreshed by
/// re-authentication is picked up immediately.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    session: Session,
    service: Service,
}

impl ServiceClient {
    /// Bind a session to a service.
    #[must_use]
    pub const fn new(session: Session, service: Service) -> Self {
        Self { session, service }
    }

    /// Logical service this client talks to.
    #[must_use]
    pub const fn service(&self) -> Service {
        self.service
    }

    /// Underlying session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Current base URL of the service.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the service cannot be resolved.
    pub fn base_url(&self) -> Result<String> {
        let base = self.session.endpoints().resolve(self.service.name())?;
        Ok(base.trim_end_matches('/').to_string())
    }

    /// Absolute URL for `path` (which starts with `/`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the service cannot be resolved.
    pub fn url(&self, path: &str) -> Result<String> {
        Ok(format!("{}{path}", self.base_url()?))
    }

    /// Project id used to build tenant-scoped paths.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] when no project id is known yet.
    pub async fn tenant_id(&self) -> Result<String> {
        self.session.tokens().tenant_id().await.ok_or_else(|| {
            Error::ConfigError(format!(
                "{} requires a project id; configure tenant_id or authenticate first",
                self.service
            ))
        })
    }

    /// Start a request against `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the service cannot be resolved.
    pub fn request(&self, method: Method, path: &str) -> Result<ApiRequest> {
        Ok(ApiRequest::new(method, self.url(path)?))
    }

    /// Execute a prepared request.
    ///
    /// # Errors
    ///
    /// See [`Session::execute`].
    pub async fn execute(&self, request: &ApiRequest) -> Result<Response> {
        self.session.execute(request).await
    }

    /// Execute a request and parse the whole body as JSON.
    ///
    /// # Errors
    ///
    /// Returns API errors from [`Session::execute`] or [`Error::ParseError`].
    pub async fn fetch_json<R>(&self, request: &ApiRequest) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let response = self.execute(request).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(Error::from)
    }

    /// Execute a request and deserialize the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns API errors from [`Session::execute`] or [`Error::ParseError`].
    pub async fn fetch_key<R>(&self, request: &ApiRequest, key: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let document: Value = self.fetch_json(request).await?;
        take_key(document, key)
    }

    /// GET `path` and unwrap `key`.
    ///
    /// # Errors
    ///
    /// Returns API errors or [`Error::ParseError`].
    pub async fn get_key<R>(
        &self,
        path: &str,
        params: Vec<(&'static str, String)>,
        key: &str,
    ) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let request = self.request(Method::GET, path)?.with_query(params);
        self.fetch_key(&request, key).await
    }

    /// GET `path` and parse the whole body.
    ///
    /// # Errors
    ///
    /// Returns API errors or [`Error::ParseError`].
    pub async fn get_json<R>(&self, path: &str, params: Vec<(&'static str, String)>) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let request = self.request(Method::GET, path)?.with_query(params);
        self.fetch_json(&request).await
    }

    /// Send a JSON body and unwrap `key` from the response.
    ///
    /// # Errors
    ///
    /// Returns API errors or [`Error::ParseError`].
    pub async fn send_key<B, R>(&self, method: Method, path: &str, body: &B, key: &str) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.request(method, path)?.with_json(body)?;
        self.fetch_key(&request, key).await
    }

    /// Send a JSON body and parse the whole response.
    ///
    /// # Errors
    ///
    /// Returns API errors or [`Error::ParseError`].
    pub async fn send_json<B, R>(&self, method: Method, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.request(method, path)?.with_json(body)?;
        self.fetch_json(&request).await
    }

    /// Send a request whose response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns API errors from [`Session::execute`].
    pub async fn send_empty<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.request(method, path)?;
        if let Some(payload) = body {
            request = request.with_json(payload)?;
        }
        self.execute(&request).await.map(|_| ())
    }

    /// DELETE `path`.
    ///
    /// # Errors
    ///
    /// Returns API errors from [`Session::execute`].
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send_empty::<()>(Method::DELETE, path, None).await
    }
}
