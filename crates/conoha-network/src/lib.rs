//! Networking API client and data models for ConoHa VPS v3.
//!
//! Security groups and their rules, private networks and subnets, ports
//! (including additional public IP allocation) and QoS policies.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::NetworkClient;
pub use models::{
    AddressPair, CreatePortRequest, CreateSecurityGroupRuleRequest, Direction, FixedIp, Network,
    Port, QosPolicy, SecurityGroup, SecurityGroupRule, Subnet, UpdatePortRequest,
    UpdateSecurityGroupRequest,
};

/// Convenient result alias that reuses the shared ConoHa error type.
pub type Result<T> = conoha_core::Result<T>;
