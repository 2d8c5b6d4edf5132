//! Asynchronous networking client.

use crate::models::{
    AllocateIpRequest, CreatePortRequest, CreateSecurityGroupRuleRequest, CreateSubnetRequest,
    Network, Port, QosPolicy, SecurityGroup, SecurityGroupRule, Subnet, UpdatePortRequest,
    UpdateSecurityGroupRequest,
};
use crate::Result;
use conoha_core::client::wrap;
use conoha_core::{Error, Service, ServiceClient, Session};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

const PREFIX: &str = "/v2.0";

/// Allowed number of additional IPs per allocation.
pub const ALLOCATE_IP_RANGE: std::ops::RangeInclusive<u8> = 1..=16;

/// Client for the networking service.
#[derive(Debug, Clone)]
pub struct NetworkClient {
    inner: ServiceClient,
}

impl NetworkClient {
    /// Create a client sharing `session`'s token and endpoints.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            inner: ServiceClient::new(session, Service::Network),
        }
    }

    /// Current base URL.
    pub fn base_url(&self) -> Result<String> {
        self.inner.base_url()
    }

    async fn list<R: DeserializeOwned>(&self, collection: &str, key: &str) -> Result<Vec<R>> {
        self.inner
            .get_key(&format!("{PREFIX}/{collection}"), Vec::new(), key)
            .await
    }

    async fn get<R: DeserializeOwned>(&self, collection: &str, id: &str, key: &str) -> Result<R> {
        self.inner
            .get_key(&format!("{PREFIX}/{collection}/{id}"), Vec::new(), key)
            .await
    }

    async fn create<B, R>(&self, collection: &str, key: &'static str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.inner
            .send_key(
                Method::POST,
                &format!("{PREFIX}/{collection}"),
                &wrap(key, body),
                key,
            )
            .await
    }

    async fn update<B, R>(
        &self,
        collection: &str,
        id: &str,
        key: &'static str,
        body: &B,
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.inner
            .send_key(
                Method::PUT,
                &format!("{PREFIX}/{collection}/{id}"),
                &wrap(key, body),
                key,
            )
            .await
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<()> {
        self.inner
            .delete(&format!("{PREFIX}/{collection}/{id}"))
            .await
    }

    // Security groups

    /// List security groups.
    pub async fn list_security_groups(&self) -> Result<Vec<SecurityGroup>> {
        self.list("security-groups", "security_groups").await
    }

    /// Create a security group.
    pub async fn create_security_group(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<SecurityGroup> {
        let request = UpdateSecurityGroupRequest {
            name: Some(name.to_string()),
            description: description.filter(|d| !d.is_empty()).map(str::to_string),
        };
        self.create("security-groups", "security_group", &request)
            .await
    }

    /// Fetch one security group with its rules.
    pub async fn get_security_group(&self, security_group_id: &str) -> Result<SecurityGroup> {
        self.get("security-groups", security_group_id, "security_group")
            .await
    }

    /// Rename or re-describe a security group.
    pub async fn update_security_group(
        &self,
        security_group_id: &str,
        request: &UpdateSecurityGroupRequest,
    ) -> Result<SecurityGroup> {
        self.update("security-groups", security_group_id, "security_group", request)
            .await
    }

    /// Delete a security group.
    pub async fn delete_security_group(&self, security_group_id: &str) -> Result<()> {
        self.remove("security-groups", security_group_id).await
    }

    // Security group rules

    /// List rules of every security group.
    pub async fn list_security_group_rules(&self) -> Result<Vec<SecurityGroupRule>> {
        self.list("security-group-rules", "security_group_rules")
            .await
    }

    /// Add a rule to a security group.
    pub async fn create_security_group_rule(
        &self,
        request: &CreateSecurityGroupRuleRequest,
    ) -> Result<SecurityGroupRule> {
        self.create("security-group-rules", "security_group_rule", request)
            .await
    }

    /// Fetch one rule.
    pub async fn get_security_group_rule(&self, rule_id: &str) -> Result<SecurityGroupRule> {
        self.get("security-group-rules", rule_id, "security_group_rule")
            .await
    }

    /// Delete a rule.
    pub async fn delete_security_group_rule(&self, rule_id: &str) -> Result<()> {
        self.remove("security-group-rules", rule_id).await
    }

    // Networks

    /// List networks.
    pub async fn list_networks(&self) -> Result<Vec<Network>> {
        self.list("networks", "networks").await
    }

    /// Fetch one network.
    pub async fn get_network(&self, network_id: &str) -> Result<Network> {
        self.get("networks", network_id, "network").await
    }

    /// Create a private network.
    pub async fn create_network(&self, name: Option<&str>) -> Result<Network> {
        let body = match name.filter(|n| !n.is_empty()) {
            Some(name) => json!({ "name": name }),
            None => json!({}),
        };
        self.create("networks", "network", &body).await
    }

    /// Delete a network.
    pub async fn delete_network(&self, network_id: &str) -> Result<()> {
        self.remove("networks", network_id).await
    }

    // Subnets

    /// List subnets.
    pub async fn list_subnets(&self) -> Result<Vec<Subnet>> {
        self.list("subnets", "subnets").await
    }

    /// Fetch one subnet.
    pub async fn get_subnet(&self, subnet_id: &str) -> Result<Subnet> {
        self.get("subnets", subnet_id, "subnet").await
    }

    /// Create a subnet; `ip_version` defaults to 4.
    pub async fn create_subnet(
        &self,
        network_id: &str,
        cidr: &str,
        ip_version: Option<u8>,
        name: Option<&str>,
    ) -> Result<Subnet> {
        let body = CreateSubnetRequest {
            network_id,
            cidr,
            ip_version: ip_version.unwrap_or(4),
            name: name.filter(|n| !n.is_empty()),
        };
        self.create("subnets", "subnet", &body).await
    }

    /// Delete a subnet.
    pub async fn delete_subnet(&self, subnet_id: &str) -> Result<()> {
        self.remove("subnets", subnet_id).await
    }

    // Ports

    /// List ports.
    pub async fn list_ports(&self) -> Result<Vec<Port>> {
        self.list("ports", "ports").await
    }

    /// Fetch one port.
    pub async fn get_port(&self, port_id: &str) -> Result<Port> {
        self.get("ports", port_id, "port").await
    }

    /// Create a port.
    pub async fn create_port(&self, request: &CreatePortRequest) -> Result<Port> {
        self.create("ports", "port", request).await
    }

    /// Allocate `count` additional public IPs (1 to 16) as a single port.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] without sending anything when
    /// `count` is out of range.
    pub async fn create_additional_ip_port(
        &self,
        count: u8,
        security_groups: Option<&[String]>,
    ) -> Result<Port> {
        if !ALLOCATE_IP_RANGE.contains(&count) {
            return Err(Error::InvalidRequest(format!(
                "additional IP count must be between 1 and 16, got {count}"
            )));
        }
        let body = AllocateIpRequest {
            count,
            security_groups: security_groups.filter(|groups| !groups.is_empty()),
        };
        self.inner
            .send_key(
                Method::POST,
                &format!("{PREFIX}/allocateips"),
                &wrap("allocateip", &body),
                "port",
            )
            .await
    }

    /// Update a port.
    pub async fn update_port(&self, port_id: &str, request: &UpdatePortRequest) -> Result<Port> {
        self.update("ports", port_id, "port", request).await
    }

    /// Delete a port.
    pub async fn delete_port(&self, port_id: &str) -> Result<()> {
        self.remove("ports", port_id).await
    }

    // QoS

    /// List QoS policies.
    pub async fn list_qos_policies(&self) -> Result<Vec<QosPolicy>> {
        self.list("qos/policies", "policies").await
    }

    /// Fetch one QoS policy.
    pub async fn get_qos_policy(&self, policy_id: &str) -> Result<QosPolicy> {
        self.get("qos/policies", policy_id, "policy").await
    }
}
