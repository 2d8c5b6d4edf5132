//! Load balancer models.
//!
//! Response types keep enum-like fields as strings so new values from the
//! service do not break parsing; request types use the closed enums below.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

/// Listener and pool protocol.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    /// Layer 4 TCP.
    Tcp,
    /// Layer 4 UDP.
    Udp,
    /// HTTP.
    Http,
    /// HTTPS passthrough.
    Https,
}

/// Pool balancing algorithm.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LbAlgorithm {
    /// Rotate across members.
    RoundRobin,
    /// Member with the fewest connections.
    LeastConnections,
    /// Stick to a member per source address.
    SourceIp,
}

/// Health check kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum MonitorType {
    /// TCP connect.
    Tcp,
    /// UDP probe.
    Udp,
    /// ICMP echo.
    Ping,
    /// HTTP request.
    Http,
    /// HTTPS request.
    Https,
}

/// Reference to a related resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdRef {
    /// Resource id.
    pub id: String,
}

/// Load balancer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadBalancer {
    /// Id.
    pub id: String,
    /// Name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Subnet of the virtual IP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vip_subnet_id: Option<String>,
    /// Virtual IP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vip_address: Option<String>,
    /// Port of the virtual IP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vip_port_id: Option<String>,
    /// Administrative state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    /// Provisioning status, e.g. `ACTIVE` or `PENDING_CREATE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_status: Option<String>,
    /// Operating status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_status: Option<String>,
    /// Listeners.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub listeners: Vec<IdRef>,
    /// Pools.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pools: Vec<IdRef>,
    /// Fields not modelled above, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateLoadBalancerRequest<'a> {
    pub name: &'a str,
    pub vip_subnet_id: &'a str,
    pub admin_state_up: bool,
}

/// Load balancer update; unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateLoadBalancerRequest {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New administrative state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
}

/// Listener.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Listener {
    /// Id.
    pub id: String,
    /// Name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Protocol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_port: Option<u16>,
    /// Connection limit, `-1` for unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_limit: Option<i64>,
    /// Default pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_pool_id: Option<String>,
    /// Administrative state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    /// Parent load balancers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loadbalancers: Vec<IdRef>,
    /// Fields not modelled above, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request payload for creating a listener.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateListenerRequest {
    /// Parent load balancer.
    pub loadbalancer_id: String,
    /// Protocol.
    pub protocol: Protocol,
    /// Port.
    pub protocol_port: u16,
    /// Name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Connection limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_limit: Option<i64>,
}

/// Listener update; unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateListenerRequest {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New connection limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_limit: Option<i64>,
}

/// Pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pool {
    /// Id.
    pub id: String,
    /// Name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Protocol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Algorithm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lb_algorithm: Option<String>,
    /// Attached health monitor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthmonitor_id: Option<String>,
    /// Listeners.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub listeners: Vec<IdRef>,
    /// Members.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<IdRef>,
    /// Fields not modelled above, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request payload for creating a pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatePoolRequest {
    /// Listener served by the pool.
    pub listener_id: String,
    /// Protocol.
    pub protocol: Protocol,
    /// Algorithm.
    pub lb_algorithm: LbAlgorithm,
    /// Name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Pool update; unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdatePoolRequest {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New algorithm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lb_algorithm: Option<LbAlgorithm>,
}

/// Pool member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Member {
    /// Id.
    pub id: String,
    /// Name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Backend address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Backend port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_port: Option<u16>,
    /// Relative weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    /// Subnet of the address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    /// Operating status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_status: Option<String>,
    /// Fields not modelled above, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request payload for adding a member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateMemberRequest {
    /// Backend address.
    pub address: String,
    /// Backend port.
    pub protocol_port: u16,
    /// Name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Relative weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    /// Subnet of the address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
}

/// Member update; unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateMemberRequest {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

/// Health monitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthMonitor {
    /// Id.
    pub id: String,
    /// Name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Check kind.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub monitor_type: Option<String>,
    /// Seconds between checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u32>,
    /// Seconds before a check fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    /// Failures before a member is marked down.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    /// Path probed by HTTP checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_path: Option<String>,
    /// Accepted status codes, e.g. `200-299`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_codes: Option<String>,
    /// Monitored pools.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pools: Vec<IdRef>,
    /// Fields not modelled above, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request payload for creating a health monitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[validate(schema(function = "timeout_below_delay"))]
pub struct CreateHealthMonitorRequest {
    /// Monitored pool.
    pub pool_id: String,
    /// Check kind.
    #[serde(rename = "type")]
    pub monitor_type: MonitorType,
    /// Seconds between checks.
    #[validate(range(min = 1, max = 180))]
    pub delay: u32,
    /// Seconds before a check fails; must be below `delay`.
    #[validate(range(min = 1, max = 180))]
    pub timeout: u32,
    /// Failures before a member is marked down.
    pub max_retries: u32,
    /// Name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Path probed by HTTP checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_path: Option<String>,
    /// Accepted status codes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_codes: Option<String>,
}

fn timeout_below_delay(request: &CreateHealthMonitorRequest) -> Result<(), ValidationError> {
    if request.timeout < request.delay {
        Ok(())
    } else {
        Err(ValidationError::new("timeout_not_below_delay"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn monitor(delay: u32, timeout: u32) -> CreateHealthMonitorRequest {
        CreateHealthMonitorRequest {
            pool_id: "pool-1".into(),
            monitor_type: MonitorType::Http,
            delay,
            timeout,
            max_retries: 3,
            name: None,
            url_path: Some("/health".into()),
            expected_codes: None,
        }
    }

    #[test]
    fn monitor_request_serializes_type() {
        assert_eq!(
            serde_json::to_value(monitor(10, 5)).unwrap(),
            json!({
                "pool_id": "pool-1",
                "type": "HTTP",
                "delay": 10,
                "timeout": 5,
                "max_retries": 3,
                "url_path": "/health"
            })
        );
    }

    #[test]
    fn monitor_validation() {
        assert!(monitor(10, 5).validate().is_ok());
        assert!(monitor(5, 5).validate().is_err());
        assert!(monitor(200, 5).validate().is_err());
        assert!(monitor(10, 0).validate().is_err());
    }

    #[test]
    fn algorithm_wire_names() {
        assert_eq!(
            serde_json::to_value(LbAlgorithm::LeastConnections).unwrap(),
            json!("LEAST_CONNECTIONS")
        );
        assert_eq!(serde_json::to_value(Protocol::Https).unwrap(), json!("HTTPS"));
    }
}
