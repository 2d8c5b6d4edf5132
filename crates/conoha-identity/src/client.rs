//! Asynchronous identity client.

use crate::models::{CreateCredentialRequest, Ec2Credential};
use crate::Result;
use conoha_core::{Service, ServiceClient, Session};
use reqwest::Method;

/// Client for the identity service.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    inner: ServiceClient,
}

impl IdentityClient {
    /// Create a client sharing `session`'s token and endpoints.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            inner: ServiceClient::new(session, Service::Identity),
        }
    }

    /// Current base URL.
    pub fn base_url(&self) -> Result<String> {
        self.inner.base_url()
    }

    /// List EC2 credentials of a user.
    pub async fn list_credentials(&self, user_id: &str) -> Result<Vec<Ec2Credential>> {
        self.inner
            .get_key(&credentials_path(user_id), Vec::new(), "credentials")
            .await
    }

    /// Create an EC2 credential scoped to `tenant_id`. A user may hold at most three.
    pub async fn create_credential(&self, user_id: &str, tenant_id: &str) -> Result<Ec2Credential> {
        let body = CreateCredentialRequest { tenant_id };
        self.inner
            .send_key(Method::POST, &credentials_path(user_id), &body, "credential")
            .await
    }

    /// Fetch one credential.
    pub async fn get_credential(&self, user_id: &str, credential_id: &str) -> Result<Ec2Credential> {
        let path = format!("{}/{credential_id}", credentials_path(user_id));
        self.inner.get_key(&path, Vec::new(), "credential").await
    }

    /// Delete a credential.
    pub async fn delete_credential(&self, user_id: &str, credential_id: &str) -> Result<()> {
        let path = format!("{}/{credential_id}", credentials_path(user_id));
        self.inner.delete(&path).await
    }
}

fn credentials_path(user_id: &str) -> String {
    format!("/v3/users/{user_id}/credentials/OS-EC2")
}
