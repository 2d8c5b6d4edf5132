//! Logical services and endpoint resolution.
//!
//! A service base URL is looked up through a fixed precedence chain:
//!
//! 1. explicit overrides passed when the client is built
//! 2. environment overrides (`<PREFIX>_<SERVICE>`), read once at construction
//! 3. the service catalog returned by the most recent authentication
//! 4. the static per-region URL template
//!
//! Levels 1 and 2 never change after construction. Level 3 is replaced
//! wholesale on every successful authentication.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

use crate::error::{Error, Result};

/// Default region used for template URLs
pub const DEFAULT_REGION: &str = "c3j1";

/// Default prefix for endpoint override environment variables
pub const DEFAULT_ENV_PREFIX: &str = "CONOHA_ENDPOINT";

const REGION_PLACEHOLDER: &str = "{region}";

/// Logical ConoHa services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    /// Identity (Keystone)
    Identity,
    /// Compute (Nova)
    Compute,
    /// Block storage (Cinder)
    BlockStorage,
    /// Image (Glance)
    Image,
    /// Networking (Neutron)
    Network,
    /// Load balancer (Octavia)
    LoadBalancer,
    /// DNS
    Dns,
    /// Object storage (Swift)
    ObjectStorage,
}

impl Service {
    /// Returns the logical service name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Compute => "compute",
            Self::BlockStorage => "block_storage",
            Self::Image => "image",
            Self::Network => "network",
            Self::LoadBalancer => "load_balancer",
            Self::Dns => "dns",
            Self::ObjectStorage => "object_storage",
        }
    }

    /// Returns the service type used in the identity service catalog.
    #[must_use]
    pub const fn catalog_type(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Compute => "compute",
            Self::BlockStorage => "volumev3",
            Self::Image => "image",
            Self::Network => "network",
            Self::LoadBalancer => "load-balancer",
            Self::Dns => "dns",
            Self::ObjectStorage => "object-store",
        }
    }

    /// Returns the per-region URL template.
    #[must_use]
    pub const fn url_template(&self) -> &'static str {
        match self {
            Self::Identity => "https://identity.{region}.conoha.io",
            Self::Compute => "https://compute.{region}.conoha.io",
            Self::BlockStorage => "https://block-storage.{region}.conoha.io",
            Self::Image => "https://image-service.{region}.conoha.io",
            Self::Network => "https://networking.{region}.conoha.io",
            Self::LoadBalancer => "https://lbaas.{region}.conoha.io",
            Self::Dns => "https://dns-service.{region}.conoha.io",
            Self::ObjectStorage => "https://object-storage.{region}.conoha.io",
        }
    }

    /// Returns the template URL with the region substituted.
    #[must_use]
    pub fn templated_url(&self, region: &str) -> String {
        self.url_template().replace(REGION_PLACEHOLDER, region)
    }

    /// Returns the environment variable consulted for this service.
    #[must_use]
    pub fn env_var(&self, prefix: &str) -> String {
        format!("{prefix}_{}", self.name().to_uppercase())
    }

    /// Map a catalog service type back to the logical service.
    #[must_use]
    pub fn from_catalog_type(service_type: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|service| service.catalog_type() == service_type)
    }

    /// Returns all available services.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Identity,
            Self::Compute,
            Self::BlockStorage,
            Self::Image,
            Self::Network,
            Self::LoadBalancer,
            Self::Dns,
            Self::ObjectStorage,
        ]
    }
}

impl FromStr for Service {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|service| service.name() == s)
            .ok_or_else(|| Error::ConfigError(format!("Unknown service: {s}")))
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Resolves logical service names to base URLs.
#[derive(Debug)]
pub struct EndpointResolver {
    region: String,
    overrides: HashMap<String, String>,
    environment: HashMap<String, String>,
    catalog: RwLock<HashMap<String, String>>,
}

impl EndpointResolver {
    /// Create a resolver from explicit overrides and pre-loaded environment values.
    #[must_use]
    pub fn new(
        region: impl Into<String>,
        overrides: HashMap<String, String>,
        environment: HashMap<String, String>,
    ) -> Self {
        Self {
            region: region.into(),
            overrides,
            environment,
            catalog: RwLock::new(HashMap::new()),
        }
    }

    /// Create a resolver that reads environment overrides from the process environment.
    #[must_use]
    pub fn from_env(
        region: impl Into<String>,
        overrides: HashMap<String, String>,
        prefix: &str,
    ) -> Self {
        let environment = Self::load_environment(prefix, |name| std::env::var(name).ok());
        Self::new(region, overrides, environment)
    }

    /// Collect endpoint overrides for every known service using `lookup`.
    ///
    /// Empty values are ignored and trailing slashes are stripped.
    pub fn load_environment<F>(prefix: &str, lookup: F) -> HashMap<String, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        Service::all()
            .iter()
            .filter_map(|service| {
                let value = lookup(&service.env_var(prefix))?;
                let value = value.trim_end_matches('/');
                (!value.is_empty()).then(|| (service.name().to_string(), value.to_string()))
            })
            .collect()
    }

    /// Region used for template substitution.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Resolve the base URL for a logical service name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] when no level of the chain knows the service.
    pub fn resolve(&self, service: &str) -> Result<String> {
        if let Some(url) = self.overrides.get(service) {
            return Ok(url.clone());
        }
        if let Some(url) = self.environment.get(service) {
            return Ok(url.clone());
        }
        if let Some(url) = self
            .catalog
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(service)
        {
            return Ok(url.clone());
        }
        if let Ok(known) = service.parse::<Service>() {
            return Ok(known.templated_url(&self.region));
        }
        Err(Error::ConfigError(format!("Unknown service: {service}")))
    }

    /// Replace the catalog-derived endpoints.
    pub fn replace_catalog(&self, entries: HashMap<String, String>) {
        *self.catalog.write().unwrap_or_else(PoisonError::into_inner) = entries;
    }

    /// Snapshot of the catalog-derived endpoints.
    #[must_use]
    pub fn catalog(&self) -> HashMap<String, String> {
        self.catalog
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
