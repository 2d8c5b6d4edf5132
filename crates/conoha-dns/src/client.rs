//! Asynchronous DNS client.

use crate::models::{
    CreateDomainRequest, CreateRecordRequest, Domain, DomainListParams, Record,
    UpdateDomainRequest, UpdateRecordRequest,
};
use crate::Result;
use conoha_core::{Service, ServiceClient, Session};
use reqwest::Method;

const PREFIX: &str = "/v1";

/// Client for the DNS service.
#[derive(Debug, Clone)]
pub struct DnsClient {
    inner: ServiceClient,
}

impl DnsClient {
    /// Create a client sharing `session`'s token and endpoints.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            inner: ServiceClient::new(session, Service::Dns),
        }
    }

    /// Current base URL.
    pub fn base_url(&self) -> Result<String> {
        self.inner.base_url()
    }

    /// List domains.
    pub async fn list_domains(&self, params: &DomainListParams) -> Result<Vec<Domain>> {
        self.inner
            .get_key(&format!("{PREFIX}/domains"), params.to_pairs(), "domains")
            .await
    }

    /// Fetch one domain.
    pub async fn get_domain(&self, domain_id: &str) -> Result<Domain> {
        self.inner
            .get_json(&format!("{PREFIX}/domains/{domain_id}"), Vec::new())
            .await
    }

    /// Register a domain.
    pub async fn create_domain(&self, request: &CreateDomainRequest) -> Result<Domain> {
        self.inner
            .send_json(Method::POST, &format!("{PREFIX}/domains"), request)
            .await
    }

    /// Update a domain's TTL or contact.
    pub async fn update_domain(
        &self,
        domain_id: &str,
        request: &UpdateDomainRequest,
    ) -> Result<Domain> {
        self.inner
            .send_json(
                Method::PUT,
                &format!("{PREFIX}/domains/{domain_id}"),
                request,
            )
            .await
    }

    /// Delete a domain and all its records.
    pub async fn delete_domain(&self, domain_id: &str) -> Result<()> {
        self.inner
            .delete(&format!("{PREFIX}/domains/{domain_id}"))
            .await
    }

    /// List the records of a domain.
    pub async fn list_records(&self, domain_id: &str) -> Result<Vec<Record>> {
        self.inner
            .get_key(
                &format!("{PREFIX}/domains/{domain_id}/records"),
                Vec::new(),
                "records",
            )
            .await
    }

    /// Fetch one record.
    pub async fn get_record(&self, domain_id: &str, record_id: &str) -> Result<Record> {
        self.inner
            .get_json(
                &format!("{PREFIX}/domains/{domain_id}/records/{record_id}"),
                Vec::new(),
            )
            .await
    }

    /// Create a record.
    pub async fn create_record(
        &self,
        domain_id: &str,
        request: &CreateRecordRequest,
    ) -> Result<Record> {
        self.inner
            .send_json(
                Method::POST,
                &format!("{PREFIX}/domains/{domain_id}/records"),
                request,
            )
            .await
    }

    /// Update a record.
    pub async fn update_record(
        &self,
        domain_id: &str,
        record_id: &str,
        request: &UpdateRecordRequest,
    ) -> Result<Record> {
        self.inner
            .send_json(
                Method::PUT,
                &format!("{PREFIX}/domains/{domain_id}/records/{record_id}"),
                request,
            )
            .await
    }

    /// Delete a record.
    pub async fn delete_record(&self, domain_id: &str, record_id: &str) -> Result<()> {
        self.inner
            .delete(&format!("{PREFIX}/domains/{domain_id}/records/{record_id}"))
            .await
    }
}
