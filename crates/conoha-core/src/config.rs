//! Configuration structures for ConoHa clients.
//!
//! [`ConohaConfig`] holds the non-secret settings: region, timeout, explicit
//! endpoint overrides and the environment variable prefix. Credentials live in
//! [`crate::auth::Credentials`] so they never pass through serde.

use crate::endpoint::{DEFAULT_ENV_PREFIX, DEFAULT_REGION};
use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Default timeout for a single HTTP attempt, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for a ConoHa client instance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConohaConfig {
    /// Region substituted into template URLs
    #[validate(length(min = 1))]
    #[serde(default = "default_region")]
    pub region: String,

    /// Timeout for each HTTP attempt in seconds
    #[validate(range(min = 1, max = 600))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Explicit endpoint overrides keyed by logical service name
    #[serde(default)]
    pub endpoints: HashMap<String, String>,

    /// Prefix for endpoint override environment variables
    #[validate(length(min = 1))]
    #[serde(default = "default_env_prefix")]
    pub env_prefix: String,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_env_prefix() -> String {
    DEFAULT_ENV_PREFIX.to_string()
}

impl ConohaConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            region: default_region(),
            request_timeout_secs: default_request_timeout_secs(),
            endpoints: HashMap::new(),
            env_prefix: default_env_prefix(),
        }
    }

    /// Set the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Add an explicit endpoint override.
    #[must_use]
    pub fn with_endpoint(mut self, service: impl Into<String>, url: impl Into<String>) -> Self {
        self.endpoints.insert(service.into(), url.into());
        self
    }

    /// Set the environment variable prefix.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Check that every explicit override is an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first override that cannot be parsed.
    pub fn validate_endpoints(&self) -> Result<(), Error> {
        for (service, url) in &self.endpoints {
            Url::parse(url).map_err(|e| {
                Error::ConfigError(format!("Invalid endpoint for `{service}` ({url}): {e}"))
            })?;
        }
        Ok(())
    }

    /// Run field validation and endpoint checks.
    ///
    /// # Errors
    ///
    /// Returns an error if any setting is out of range.
    pub fn check(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;
        self.validate_endpoints()
    }
}

impl Default for ConohaConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ConohaConfig::new();
        assert_eq!(config.region, "c3j1");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.env_prefix, "CONOHA_ENDPOINT");
        assert!(config.endpoints.is_empty());
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ConohaConfig::new()
            .with_region("tyo1")
            .with_timeout(90)
            .with_endpoint("compute", "https://custom")
            .with_env_prefix("MY_ENDPOINT");

        assert_eq!(config.region, "tyo1");
        assert_eq!(config.request_timeout_secs, 90);
        assert_eq!(config.endpoints["compute"], "https://custom");
        assert_eq!(config.env_prefix, "MY_ENDPOINT");
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_config_rejects_zero_timeout() {
        let config = ConohaConfig::new().with_timeout(0);
        assert!(matches!(config.check(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_config_rejects_relative_endpoint() {
        let config = ConohaConfig::new().with_endpoint("dns", "dns-service");
        let err = config.check().unwrap_err();
        assert!(err.to_string().contains("dns"));
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: ConohaConfig =
            serde_json::from_str(r#"{"endpoints": {"dns": "https://dns.local"}}"#).unwrap();
        assert_eq!(config.region, "c3j1");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.endpoints["dns"], "https://dns.local");
    }
}
