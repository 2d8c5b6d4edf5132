//! Asynchronous object storage client.

use crate::models::{
    headers_to_map, AccountInfo, Container, ContainerMetadata, ListParams, ObjectEntry,
};
use crate::{temp_url, Result};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use conoha_core::{ApiRequest, Error, Service, ServiceClient, Session};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeMap;
use tracing::debug;

const QUOTA_HEADER: &str = "X-Account-Meta-Quota-Giga-Bytes";
const TEMP_URL_KEY_HEADER: &str = "X-Account-Meta-Temp-URL-Key";

/// Client for the object storage service.
#[derive(Debug, Clone)]
pub struct ObjectStorageClient {
    inner: ServiceClient,
}

impl ObjectStorageClient {
    /// Create a client sharing `session`'s token and endpoints.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            inner: ServiceClient::new(session, Service::ObjectStorage),
        }
    }

    /// Current base URL.
    pub fn base_url(&self) -> Result<String> {
        self.inner.base_url()
    }

    /// `/v1/AUTH_<tenant><path>`
    async fn account_path(&self, path: &str) -> Result<String> {
        let tenant_id = self.inner.tenant_id().await?;
        Ok(format!("/v1/AUTH_{tenant_id}{path}"))
    }

    async fn account_request(&self, method: Method, path: &str) -> Result<ApiRequest> {
        let path = self.account_path(path).await?;
        self.inner.request(method, &path)
    }

    async fn send(&self, request: &ApiRequest) -> Result<reqwest::Response> {
        self.inner.execute(request).await
    }

    // Account

    /// Account statistics from a HEAD on the account.
    pub async fn get_account_info(&self) -> Result<AccountInfo> {
        let request = self.account_request(Method::HEAD, "").await?;
        let response = self.send(&request).await?;
        Ok(AccountInfo::from_headers(response.headers()))
    }

    /// Set the account quota in gigabytes (100 GB steps, at least 100).
    pub async fn set_account_quota(&self, size_gb: u64) -> Result<()> {
        let request = self
            .account_request(Method::POST, "")
            .await?
            .with_header(QUOTA_HEADER, &size_gb.to_string())?;
        self.send(&request).await.map(|_| ())
    }

    /// Store the account key used to sign temporary URLs.
    pub async fn set_temp_url_key(&self, key: &SecretString) -> Result<()> {
        let request = self
            .account_request(Method::POST, "")
            .await?
            .with_header(TEMP_URL_KEY_HEADER, key.expose_secret())?;
        self.send(&request).await.map(|_| ())
    }

    // Containers

    /// List containers.
    pub async fn list_containers(&self, params: &ListParams) -> Result<Vec<Container>> {
        let request = self
            .account_request(Method::GET, "")
            .await?
            .with_query(params.to_pairs());
        self.inner.fetch_json(&request).await
    }

    /// Container statistics from a HEAD on the container.
    pub async fn get_container_metadata(&self, container: &str) -> Result<ContainerMetadata> {
        let request = self
            .account_request(Method::HEAD, &format!("/{container}"))
            .await?;
        let response = self.send(&request).await?;
        Ok(ContainerMetadata::from_headers(response.headers()))
    }

    /// Create a container. Creating an existing container succeeds.
    pub async fn create_container(&self, container: &str) -> Result<()> {
        let request = self
            .account_request(Method::PUT, &format!("/{container}"))
            .await?;
        self.send(&request).await.map(|_| ())
    }

    /// Delete an empty container.
    pub async fn delete_container(&self, container: &str) -> Result<()> {
        let request = self
            .account_request(Method::DELETE, &format!("/{container}"))
            .await?;
        self.send(&request).await.map(|_| ())
    }

    // Objects

    /// List objects in a container.
    pub async fn list_objects(
        &self,
        container: &str,
        params: &ListParams,
    ) -> Result<Vec<ObjectEntry>> {
        let request = self
            .account_request(Method::GET, &format!("/{container}"))
            .await?
            .with_query(params.to_pairs());
        self.inner.fetch_json(&request).await
    }

    /// Upload an object (up to 5 GB) from raw bytes.
    pub async fn upload_object(
        &self,
        container: &str,
        object: &str,
        data: impl Into<Bytes>,
        content_type: Option<&str>,
    ) -> Result<()> {
        let data = data.into();
        debug!(container, object, bytes = data.len(), "uploading object");
        let mut request = self
            .account_request(Method::PUT, &format!("/{container}/{object}"))
            .await?
            .with_bytes(data);
        if let Some(content_type) = content_type.filter(|value| !value.is_empty()) {
            request = request.with_header("Content-Type", content_type)?;
        }
        self.send(&request).await.map(|_| ())
    }

    /// Download an object's content.
    ///
    /// Sent with `Accept: */*` in place of the default `application/json`,
    /// so the object is returned as stored whatever its content type.
    pub async fn download_object(&self, container: &str, object: &str) -> Result<Bytes> {
        let request = self
            .account_request(Method::GET, &format!("/{container}/{object}"))
            .await?
            .with_header("Accept", "*/*")?;
        let response = self.send(&request).await?;
        Ok(response.bytes().await?)
    }

    /// Delete an object.
    pub async fn delete_object(&self, container: &str, object: &str) -> Result<()> {
        let request = self
            .account_request(Method::DELETE, &format!("/{container}/{object}"))
            .await?;
        self.send(&request).await.map(|_| ())
    }

    /// Server-side copy of an object.
    pub async fn copy_object(
        &self,
        src_container: &str,
        src_object: &str,
        dst_container: &str,
        dst_object: &str,
    ) -> Result<()> {
        let copy = Method::from_bytes(b"COPY")
            .map_err(|err| Error::InvalidRequest(format!("Invalid method COPY: {err}")))?;
        let request = self
            .account_request(copy, &format!("/{src_container}/{src_object}"))
            .await?
            .with_header("Destination", &format!("{dst_container}/{dst_object}"))?;
        self.send(&request).await.map(|_| ())
    }

    /// Have the service delete an object after `seconds`.
    pub async fn schedule_object_deletion(
        &self,
        container: &str,
        object: &str,
        seconds: u64,
    ) -> Result<()> {
        let request = self
            .account_request(Method::POST, &format!("/{container}/{object}"))
            .await?
            .with_header("X-Delete-After", &seconds.to_string())?;
        self.send(&request).await.map(|_| ())
    }

    /// Every response header of a HEAD on the object, keyed by lowercase name.
    pub async fn get_object_metadata(
        &self,
        container: &str,
        object: &str,
    ) -> Result<BTreeMap<String, String>> {
        let request = self
            .account_request(Method::HEAD, &format!("/{container}/{object}"))
            .await?;
        let response = self.send(&request).await?;
        Ok(headers_to_map(response.headers()))
    }

    /// Signed URL granting `method` on an object until `expires_at`.
    ///
    /// No request is made; `key` must match the account's temp URL key.
    pub async fn temp_url(
        &self,
        method: &str,
        container: &str,
        object: &str,
        expires_at: DateTime<Utc>,
        key: &SecretString,
    ) -> Result<String> {
        let path = self
            .account_path(&format!("/{container}/{object}"))
            .await?;
        temp_url::build(
            &self.base_url()?,
            method,
            expires_at.timestamp(),
            &path,
            key,
        )
    }
}
