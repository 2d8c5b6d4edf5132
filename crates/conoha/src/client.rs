//! Top-level client and its builder.

use conoha_compute::ComputeClient;
use conoha_core::{
    ConohaConfig, Credentials, EndpointResolver, Error, ProjectScope, Result, Session, UserRef,
};
use conoha_dns::DnsClient;
use conoha_identity::IdentityClient;
use conoha_image::ImageClient;
use conoha_loadbalancer::LoadBalancerClient;
use conoha_network::NetworkClient;
use conoha_object_storage::ObjectStorageClient;
use conoha_volume::VolumeClient;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

/// Builder for [`ConohaClient`].
///
/// When both an id and a name are given for the user or the project, the id
/// is used.
#[derive(Debug, Default)]
pub struct ConohaClientBuilder {
    config: ConohaConfig,
    username: Option<String>,
    user_id: Option<String>,
    password: Option<SecretString>,
    tenant_id: Option<String>,
    tenant_name: Option<String>,
    token: Option<SecretString>,
    environment: Option<HashMap<String, String>>,
}

impl ConohaClientBuilder {
    /// Replace the whole configuration. Call before the other setters.
    #[must_use]
    pub fn config(mut self, config: ConohaConfig) -> Self {
        self.config = config;
        self
    }

    /// Region substituted into the default endpoint templates.
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.region = region.into();
        self
    }

    /// Timeout for each HTTP attempt, in seconds.
    #[must_use]
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.config.request_timeout_secs = seconds;
        self
    }

    /// Explicit base URL for a logical service, e.g. `("compute", url)`.
    #[must_use]
    pub fn endpoint(mut self, service: impl Into<String>, url: impl Into<String>) -> Self {
        self.config.endpoints.insert(service.into(), url.into());
        self
    }

    /// API user name.
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// API user id.
    #[must_use]
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// API password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Project (tenant) id.
    #[must_use]
    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Project (tenant) name.
    #[must_use]
    pub fn tenant_name(mut self, tenant_name: impl Into<String>) -> Self {
        self.tenant_name = Some(tenant_name.into());
        self
    }

    /// Token obtained elsewhere. Without a password it cannot be refreshed.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Use these endpoint environment values instead of reading the process
    /// environment. Keys are logical service names.
    #[must_use]
    pub fn environment_overrides(mut self, environment: HashMap<String, String>) -> Self {
        self.environment = Some(environment);
        self
    }

    fn credentials(&mut self) -> Result<Credentials> {
        let mut credentials = Credentials::new();

        let user = match (self.user_id.take(), self.username.take()) {
            (Some(id), _) => Some(UserRef::Id(id)),
            (None, Some(name)) => Some(UserRef::Name(name)),
            (None, None) => None,
        };
        match (user, self.password.take()) {
            (Some(user), Some(password)) => {
                credentials = credentials.with_password(user, password.expose_secret());
            }
            (None, Some(_)) => {
                return Err(Error::ConfigError(
                    "a password requires a username or user_id".to_string(),
                ));
            }
            _ => {}
        }

        if let Some(token) = self.token.take() {
            credentials = credentials.with_token(token.expose_secret());
        }

        let scope = match (self.tenant_id.take(), self.tenant_name.take()) {
            (Some(id), _) => Some(ProjectScope::Id(id)),
            (None, Some(name)) => Some(ProjectScope::Name(name)),
            (None, None) => None,
        };
        if let Some(scope) = scope {
            credentials = credentials.with_scope(scope);
        }
        Ok(credentials)
    }

    /// Build the client.
    ///
    /// Authenticates immediately when password credentials are present and
    /// no token was supplied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for invalid settings and any error of
    /// the initial authentication.
    pub async fn build(mut self) -> Result<ConohaClient> {
        let credentials = self.credentials()?;
        let eager = credentials.can_refresh() && !credentials.has_token();

        let environment = self.environment.take().unwrap_or_else(|| {
            EndpointResolver::load_environment(&self.config.env_prefix, |name| {
                std::env::var(name).ok()
            })
        });
        let session = Session::from_config(&self.config, credentials, environment)?;

        if eager {
            session.tokens().authenticate().await?;
        }
        debug!(region = %self.config.region, authenticated = eager, "ConoHa client ready");

        Ok(ConohaClient::new(session))
    }
}

/// Entry point to every ConoHa service.
#[derive(Debug)]
pub struct ConohaClient {
    session: Session,
    identity: OnceLock<IdentityClient>,
    compute: OnceLock<ComputeClient>,
    volume: OnceLock<VolumeClient>,
    image: OnceLock<ImageClient>,
    network: OnceLock<NetworkClient>,
    load_balancer: OnceLock<LoadBalancerClient>,
    dns: OnceLock<DnsClient>,
    object_storage: OnceLock<ObjectStorageClient>,
}

impl ConohaClient {
    /// Start building a client.
    #[must_use]
    pub fn builder() -> ConohaClientBuilder {
        ConohaClientBuilder::default()
    }

    /// Wrap an existing session.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            session,
            identity: OnceLock::new(),
            compute: OnceLock::new(),
            volume: OnceLock::new(),
            image: OnceLock::new(),
            network: OnceLock::new(),
            load_balancer: OnceLock::new(),
            dns: OnceLock::new(),
            object_storage: OnceLock::new(),
        }
    }

    /// Shared session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Identity service.
    pub fn identity(&self) -> &IdentityClient {
        self.identity
            .get_or_init(|| IdentityClient::new(self.session.clone()))
    }

    /// Compute service.
    pub fn compute(&self) -> &ComputeClient {
        self.compute
            .get_or_init(|| ComputeClient::new(self.session.clone()))
    }

    /// Block storage service.
    pub fn volume(&self) -> &VolumeClient {
        self.volume
            .get_or_init(|| VolumeClient::new(self.session.clone()))
    }

    /// Image service.
    pub fn image(&self) -> &ImageClient {
        self.image
            .get_or_init(|| ImageClient::new(self.session.clone()))
    }

    /// Networking service.
    pub fn network(&self) -> &NetworkClient {
        self.network
            .get_or_init(|| NetworkClient::new(self.session.clone()))
    }

    /// Load balancer service.
    pub fn load_balancer(&self) -> &LoadBalancerClient {
        self.load_balancer
            .get_or_init(|| LoadBalancerClient::new(self.session.clone()))
    }

    /// DNS service.
    pub fn dns(&self) -> &DnsClient {
        self.dns.get_or_init(|| DnsClient::new(self.session.clone()))
    }

    /// Object storage service.
    pub fn object_storage(&self) -> &ObjectStorageClient {
        self.object_storage
            .get_or_init(|| ObjectStorageClient::new(self.session.clone()))
    }

    /// Request a new token with the configured password credentials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if no password is configured or the
    /// identity service rejects the request.
    pub async fn authenticate(&self) -> Result<()> {
        self.session.tokens().authenticate().await.map(|_| ())
    }

    /// Current token, refreshed first if it has expired.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] when no usable token exists.
    pub async fn token(&self) -> Result<SecretString> {
        self.session.tokens().valid_token().await
    }

    /// Project id, configured or learned at authentication.
    pub async fn tenant_id(&self) -> Option<String> {
        self.session.tokens().tenant_id().await
    }

    /// User id, configured or learned at authentication.
    pub async fn user_id(&self) -> Option<String> {
        self.session.tokens().user_id().await
    }

    /// Base URL currently used for a logical service name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for an unknown service.
    pub fn resolve_endpoint(&self, service: &str) -> Result<String> {
        self.session.endpoints().resolve(service)
    }

    /// Configured region.
    #[must_use]
    pub fn region(&self) -> &str {
        self.session.endpoints().region()
    }
}
