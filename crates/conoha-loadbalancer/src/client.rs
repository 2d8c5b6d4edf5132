//! Asynchronous load balancer client.

use crate::models::{
    CreateHealthMonitorRequest, CreateListenerRequest, CreateLoadBalancerRequest,
    CreateMemberRequest, CreatePoolRequest, HealthMonitor, Listener, LoadBalancer, Member, Pool,
    UpdateListenerRequest, UpdateLoadBalancerRequest, UpdateMemberRequest, UpdatePoolRequest,
};
use crate::Result;
use conoha_core::client::wrap;
use conoha_core::{Service, ServiceClient, Session};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use validator::Validate;

const PREFIX: &str = "/v2.0/lbaas";

/// Client for the load balancer service.
#[derive(Debug, Clone)]
pub struct LoadBalancerClient {
    inner: ServiceClient,
}

impl LoadBalancerClient {
    /// Create a client sharing `session`'s token and endpoints.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            inner: ServiceClient::new(session, Service::LoadBalancer),
        }
    }

    /// Current base URL.
    pub fn base_url(&self) -> Result<String> {
        self.inner.base_url()
    }

    async fn list<R: DeserializeOwned>(&self, path: &str, key: &str) -> Result<Vec<R>> {
        self.inner
            .get_key(&format!("{PREFIX}{path}"), Vec::new(), key)
            .await
    }

    async fn get<R: DeserializeOwned>(&self, path: &str, key: &str) -> Result<R> {
        self.inner
            .get_key(&format!("{PREFIX}{path}"), Vec::new(), key)
            .await
    }

    async fn send<B, R>(&self, method: Method, path: &str, key: &'static str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.inner
            .send_key(method, &format!("{PREFIX}{path}"), &wrap(key, body), key)
            .await
    }

    async fn remove(&self, path: &str) -> Result<()> {
        self.inner.delete(&format!("{PREFIX}{path}")).await
    }

    // Load balancers

    /// List load balancers.
    pub async fn list_load_balancers(&self) -> Result<Vec<LoadBalancer>> {
        self.list("/loadbalancers", "loadbalancers").await
    }

    /// Fetch one load balancer.
    pub async fn get_load_balancer(&self, lb_id: &str) -> Result<LoadBalancer> {
        self.get(&format!("/loadbalancers/{lb_id}"), "loadbalancer")
            .await
    }

    /// Create a load balancer with its virtual IP on `vip_subnet_id`.
    pub async fn create_load_balancer(
        &self,
        name: &str,
        vip_subnet_id: &str,
        admin_state_up: Option<bool>,
    ) -> Result<LoadBalancer> {
        let request = CreateLoadBalancerRequest {
            name,
            vip_subnet_id,
            admin_state_up: admin_state_up.unwrap_or(true),
        };
        self.send(Method::POST, "/loadbalancers", "loadbalancer", &request)
            .await
    }

    /// Update a load balancer.
    pub async fn update_load_balancer(
        &self,
        lb_id: &str,
        request: &UpdateLoadBalancerRequest,
    ) -> Result<LoadBalancer> {
        self.send(
            Method::PUT,
            &format!("/loadbalancers/{lb_id}"),
            "loadbalancer",
            request,
        )
        .await
    }

    /// Delete a load balancer.
    pub async fn delete_load_balancer(&self, lb_id: &str) -> Result<()> {
        self.remove(&format!("/loadbalancers/{lb_id}")).await
    }

    // Listeners

    /// List listeners.
    pub async fn list_listeners(&self) -> Result<Vec<Listener>> {
        self.list("/listeners", "listeners").await
    }

    /// Fetch one listener.
    pub async fn get_listener(&self, listener_id: &str) -> Result<Listener> {
        self.get(&format!("/listeners/{listener_id}"), "listener")
            .await
    }

    /// Create a listener on a load balancer.
    pub async fn create_listener(&self, request: &CreateListenerRequest) -> Result<Listener> {
        let request = CreateListenerRequest {
            name: non_empty(&request.name),
            ..request.clone()
        };
        self.send(Method::POST, "/listeners", "listener", &request)
            .await
    }

    /// Update a listener.
    pub async fn update_listener(
        &self,
        listener_id: &str,
        request: &UpdateListenerRequest,
    ) -> Result<Listener> {
        self.send(
            Method::PUT,
            &format!("/listeners/{listener_id}"),
            "listener",
            request,
        )
        .await
    }

    /// Delete a listener.
    pub async fn delete_listener(&self, listener_id: &str) -> Result<()> {
        self.remove(&format!("/listeners/{listener_id}")).await
    }

    // Pools

    /// List pools.
    pub async fn list_pools(&self) -> Result<Vec<Pool>> {
        self.list("/pools", "pools").await
    }

    /// Fetch one pool.
    pub async fn get_pool(&self, pool_id: &str) -> Result<Pool> {
        self.get(&format!("/pools/{pool_id}"), "pool").await
    }

    /// Create a pool behind a listener.
    pub async fn create_pool(&self, request: &CreatePoolRequest) -> Result<Pool> {
        let request = CreatePoolRequest {
            name: non_empty(&request.name),
            ..request.clone()
        };
        self.send(Method::POST, "/pools", "pool", &request).await
    }

    /// Update a pool.
    pub async fn update_pool(&self, pool_id: &str, request: &UpdatePoolRequest) -> Result<Pool> {
        self.send(Method::PUT, &format!("/pools/{pool_id}"), "pool", request)
            .await
    }

    /// Delete a pool.
    pub async fn delete_pool(&self, pool_id: &str) -> Result<()> {
        self.remove(&format!("/pools/{pool_id}")).await
    }

    // Members

    /// List the members of a pool.
    pub async fn list_members(&self, pool_id: &str) -> Result<Vec<Member>> {
        self.list(&format!("/pools/{pool_id}/members"), "members")
            .await
    }

    /// Fetch one member.
    pub async fn get_member(&self, pool_id: &str, member_id: &str) -> Result<Member> {
        self.get(&format!("/pools/{pool_id}/members/{member_id}"), "member")
            .await
    }

    /// Add a backend to a pool.
    pub async fn create_member(
        &self,
        pool_id: &str,
        request: &CreateMemberRequest,
    ) -> Result<Member> {
        let request = CreateMemberRequest {
            name: non_empty(&request.name),
            subnet_id: non_empty(&request.subnet_id),
            ..request.clone()
        };
        self.send(
            Method::POST,
            &format!("/pools/{pool_id}/members"),
            "member",
            &request,
        )
        .await
    }

    /// Update a member.
    pub async fn update_member(
        &self,
        pool_id: &str,
        member_id: &str,
        request: &UpdateMemberRequest,
    ) -> Result<Member> {
        self.send(
            Method::PUT,
            &format!("/pools/{pool_id}/members/{member_id}"),
            "member",
            request,
        )
        .await
    }

    /// Remove a backend from a pool.
    pub async fn delete_member(&self, pool_id: &str, member_id: &str) -> Result<()> {
        self.remove(&format!("/pools/{pool_id}/members/{member_id}"))
            .await
    }

    // Health monitors

    /// List health monitors.
    pub async fn list_health_monitors(&self) -> Result<Vec<HealthMonitor>> {
        self.list("/healthmonitors", "healthmonitors").await
    }

    /// Fetch one health monitor.
    pub async fn get_health_monitor(&self, monitor_id: &str) -> Result<HealthMonitor> {
        self.get(&format!("/healthmonitors/{monitor_id}"), "healthmonitor")
            .await
    }

    /// Attach a health monitor to a pool.
    ///
    /// `delay` and `timeout` must be between 1 and 180 seconds with `timeout`
    /// below `delay`; other values fail locally with a validation error.
    pub async fn create_health_monitor(
        &self,
        request: &CreateHealthMonitorRequest,
    ) -> Result<HealthMonitor> {
        request.validate()?;
        let request = CreateHealthMonitorRequest {
            name: non_empty(&request.name),
            url_path: non_empty(&request.url_path),
            expected_codes: non_empty(&request.expected_codes),
            ..request.clone()
        };
        self.send(Method::POST, "/healthmonitors", "healthmonitor", &request)
            .await
    }

    /// Rename a health monitor. `None` sends an empty update.
    pub async fn update_health_monitor(
        &self,
        monitor_id: &str,
        name: Option<&str>,
    ) -> Result<HealthMonitor> {
        let body = match name {
            Some(name) => json!({ "name": name }),
            None => json!({}),
        };
        self.send(
            Method::PUT,
            &format!("/healthmonitors/{monitor_id}"),
            "healthmonitor",
            &body,
        )
        .await
    }

    /// Delete a health monitor.
    pub async fn delete_health_monitor(&self, monitor_id: &str) -> Result<()> {
        self.remove(&format!("/healthmonitors/{monitor_id}")).await
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}
