//! Credentials and bearer token lifecycle.
//!
//! The [`TokenManager`] owns the only copy of the bearer token. It performs the
//! Keystone v3 password grant, records the token expiry minus a safety margin,
//! and replaces the catalog layer of the [`EndpointResolver`] on every
//! successful authentication.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::endpoint::{EndpointResolver, Service};
use crate::error::{Error, Result};

/// Seconds subtracted from the server-reported expiry
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 300;

/// Validity assumed when the identity response carries no expiry (24 hours)
pub const DEFAULT_TOKEN_VALIDITY_SECS: i64 = 86_400;

/// Response header carrying a freshly issued token
pub const SUBJECT_TOKEN_HEADER: &str = "x-subject-token";

const TOKENS_PATH: &str = "/v3/auth/tokens";

/// How the user is identified in a password grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRef {
    /// API user name
    Name(String),
    /// API user id
    Id(String),
}

/// Project (tenant) scope requested at authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectScope {
    /// Scope by project id
    Id(String),
    /// Scope by project name
    Name(String),
}

#[derive(Debug)]
struct PasswordGrant {
    user: UserRef,
    password: SecretString,
}

/// Credentials supplied when the client is built.
///
/// Any combination of a password grant and a pre-supplied token is accepted.
/// Only a password grant allows the token to be refreshed.
#[derive(Debug, Default)]
pub struct Credentials {
    password: Option<PasswordGrant>,
    token: Option<SecretString>,
    scope: Option<ProjectScope>,
}

impl Credentials {
    /// Empty credentials; every authenticated call will fail.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Password credentials for a user.
    #[must_use]
    pub fn password(user: UserRef, password: impl Into<String>) -> Self {
        Self::new().with_password(user, password)
    }

    /// A pre-supplied token that cannot be refreshed.
    #[must_use]
    pub fn token(token: impl Into<String>) -> Self {
        Self::new().with_token(token)
    }

    /// Add a password grant.
    #[must_use]
    pub fn with_password(mut self, user: UserRef, password: impl Into<String>) -> Self {
        self.password = Some(PasswordGrant {
            user,
            password: SecretString::from(password.into()),
        });
        self
    }

    /// Add a pre-supplied token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Scope the token to a project.
    #[must_use]
    pub fn with_scope(mut self, scope: ProjectScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// True when a password grant is available to obtain new tokens.
    #[must_use]
    pub const fn can_refresh(&self) -> bool {
        self.password.is_some()
    }

    /// True when a token was supplied up front.
    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Requested project scope.
    #[must_use]
    pub const fn scope(&self) -> Option<&ProjectScope> {
        self.scope.as_ref()
    }

    /// Build the Keystone v3 password grant body.
    fn auth_body(&self) -> Option<Value> {
        let grant = self.password.as_ref()?;
        let secret = grant.password.expose_secret();
        let user = match &grant.user {
            UserRef::Id(id) => json!({ "id": id, "password": secret }),
            UserRef::Name(name) => json!({ "name": name, "password": secret }),
        };

        let mut body = json!({
            "auth": {
                "identity": {
                    "methods": ["password"],
                    "password": { "user": user },
                },
            }
        });

        match &self.scope {
            Some(ProjectScope::Id(id)) => {
                body["auth"]["scope"] = json!({ "project": { "id": id } });
            }
            Some(ProjectScope::Name(name)) => {
                body["auth"]["scope"] = json!({ "project": { "name": name } });
            }
            None => {}
        }

        Some(body)
    }
}

/// Body of a successful token request.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Token metadata
    pub token: TokenInfo,
}

/// Token metadata returned by the identity service.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    /// Expiry timestamp (RFC 3339)
    #[serde(default)]
    pub expires_at: Option<String>,
    /// Issue timestamp (RFC 3339)
    #[serde(default)]
    pub issued_at: Option<String>,
    /// Authentication methods used
    #[serde(default)]
    pub methods: Vec<String>,
    /// Project the token is scoped to
    #[serde(default)]
    pub project: Option<NamedRef>,
    /// Authenticated user
    #[serde(default)]
    pub user: Option<NamedRef>,
    /// Service catalog
    #[serde(default)]
    pub catalog: Vec<CatalogEntry>,
}

/// An `{id, name}` reference.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NamedRef {
    /// Identifier
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
}

/// One service in the identity catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    /// Wire-level service type, e.g. `volumev3`
    #[serde(rename = "type", default)]
    pub service_type: String,
    /// Service name
    #[serde(default)]
    pub name: Option<String>,
    /// Endpoints exposed for the service
    #[serde(default)]
    pub endpoints: Vec<CatalogEndpoint>,
}

/// An interface-tagged endpoint of a catalog entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEndpoint {
    /// `public`, `internal` or `admin`
    #[serde(default)]
    pub interface: String,
    /// Base URL
    #[serde(default)]
    pub url: String,
    /// Region id
    #[serde(default)]
    pub region: Option<String>,
}

/// Extract the first public endpoint of every known service type.
#[must_use]
pub fn parse_catalog(catalog: &[CatalogEntry]) -> HashMap<String, String> {
    let mut endpoints = HashMap::new();
    for entry in catalog {
        let Some(service) = Service::from_catalog_type(&entry.service_type) else {
            continue;
        };
        if let Some(endpoint) = entry.endpoints.iter().find(|e| e.interface == "public") {
            endpoints.insert(service.name().to_string(), endpoint.url.clone());
        }
    }
    endpoints
}

/// Compute the local expiry for a token, with the safety margin applied.
#[must_use]
pub fn compute_expiry(expires_at: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let margin = ChronoDuration::seconds(TOKEN_EXPIRY_MARGIN_SECS);
    let fallback = now + ChronoDuration::seconds(DEFAULT_TOKEN_VALIDITY_SECS) - margin;

    match expires_at.map(DateTime::parse_from_rfc3339) {
        Some(Ok(at)) => at.with_timezone(&Utc) - margin,
        Some(Err(err)) => {
            warn!(error = %err, "unparsable token expiry, assuming default validity");
            fallback
        }
        None => fallback,
    }
}

#[derive(Debug, Default)]
struct TokenState {
    token: Option<SecretString>,
    expires_at: Option<DateTime<Utc>>,
    tenant_id: Option<String>,
    user_id: Option<String>,
}

impl TokenState {
    /// The stored token, unless it is past its local expiry.
    fn current(&self, now: DateTime<Utc>) -> Option<&SecretString> {
        let token = self.token.as_ref()?;
        match self.expires_at {
            Some(expires_at) if now >= expires_at => None,
            _ => Some(token),
        }
    }
}

fn duplicate(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_owned())
}

/// Holds the bearer token and refreshes it on demand.
#[derive(Debug)]
pub struct TokenManager {
    http: Client,
    credentials: Credentials,
    endpoints: Arc<EndpointResolver>,
    timeout: Duration,
    state: Mutex<TokenState>,
}

impl TokenManager {
    /// Create a token manager.
    ///
    /// A pre-supplied token is installed immediately with no known expiry.
    #[must_use]
    pub fn new(
        http: Client,
        mut credentials: Credentials,
        endpoints: Arc<EndpointResolver>,
        timeout: Duration,
    ) -> Self {
        let tenant_id = match credentials.scope() {
            Some(ProjectScope::Id(id)) => Some(id.clone()),
            _ => None,
        };
        let user_id = match credentials.password.as_ref().map(|grant| &grant.user) {
            Some(UserRef::Id(id)) => Some(id.clone()),
            _ => None,
        };
        let state = TokenState {
            token: credentials.token.take(),
            expires_at: None,
            tenant_id,
            user_id,
        };

        Self {
            http,
            credentials,
            endpoints,
            timeout,
            state: Mutex::new(state),
        }
    }

    /// True when the token can be refreshed with a password grant.
    #[must_use]
    pub const fn can_refresh(&self) -> bool {
        self.credentials.can_refresh()
    }

    /// Endpoint resolver whose catalog layer this manager maintains.
    #[must_use]
    pub fn endpoints(&self) -> &Arc<EndpointResolver> {
        &self.endpoints
    }

    /// Project id, from the configured scope or the last authentication.
    pub async fn tenant_id(&self) -> Option<String> {
        self.state.lock().await.tenant_id.clone()
    }

    /// User id, from the credentials or the last authentication.
    pub async fn user_id(&self) -> Option<String> {
        self.state.lock().await.user_id.clone()
    }

    /// Local expiry of the current token (server expiry minus the margin).
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.expires_at
    }

    /// Install a token obtained elsewhere.
    pub async fn replace_token(&self, token: impl Into<String>, expires_at: Option<DateTime<Utc>>) {
        let mut state = self.state.lock().await;
        state.token = Some(SecretString::from(token.into()));
        state.expires_at = expires_at;
    }

    /// Return a usable token, authenticating first if it is missing or expired.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] when no token is available and no
    /// password credentials were configured, or when re-authentication fails.
    pub async fn valid_token(&self) -> Result<SecretString> {
        let mut state = self.state.lock().await;
        if let Some(token) = state.current(Utc::now()) {
            return Ok(duplicate(token));
        }

        if !self.can_refresh() {
            return Err(Error::Authentication(
                "No valid token. Call authenticate() first.".to_string(),
            ));
        }

        debug!("token missing or expired, re-authenticating");
        self.exchange(&mut state).await
    }

    /// Perform a password grant against the identity service.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] when no password credentials are
    /// configured or the identity service does not answer `201 Created`.
    pub async fn authenticate(&self) -> Result<SecretString> {
        let mut state = self.state.lock().await;
        self.exchange(&mut state).await
    }

    async fn exchange(&self, state: &mut TokenState) -> Result<SecretString> {
        let body = self.credentials.auth_body().ok_or_else(|| {
            Error::Authentication("password credentials are required to authenticate".to_string())
        })?;

        let identity = self.endpoints.resolve(Service::Identity.name())?;
        let url = format!("{}{TOKENS_PATH}", identity.trim_end_matches('/'));
        info!(%url, "requesting token from identity service");

        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Authentication(format!(
                "identity service returned {} {text}",
                status.as_u16()
            )));
        }

        let token = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| {
                Error::Authentication(
                    "identity response is missing the X-Subject-Token header".to_string(),
                )
            })?;

        let bytes = response.bytes().await?;
        let payload: TokenResponse = serde_json::from_slice(&bytes)?;
        let info = payload.token;

        let expires_at = compute_expiry(info.expires_at.as_deref(), Utc::now());
        if let Some(project) = info.project {
            state.tenant_id = Some(project.id);
        }
        if let Some(user) = info.user {
            state.user_id = Some(user.id);
        }
        self.endpoints.replace_catalog(parse_catalog(&info.catalog));

        state.token = Some(SecretString::from(token.clone()));
        state.expires_at = Some(expires_at);
        info!(%expires_at, tenant_id = ?state.tenant_id, "authenticated");

        Ok(SecretString::from(token))
    }
}
