//! Load balancer API client for ConoHa VPS v3.
//!
//! Resources nest as load balancer → listener → pool → member, with health
//! monitors attached to pools. All paths live under `/v2.0/lbaas`.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::LoadBalancerClient;
pub use models::{
    CreateHealthMonitorRequest, CreateListenerRequest, CreateMemberRequest, CreatePoolRequest,
    HealthMonitor, LbAlgorithm, Listener, LoadBalancer, Member, MonitorType, Pool, Protocol,
    UpdateListenerRequest, UpdateLoadBalancerRequest, UpdateMemberRequest, UpdatePoolRequest,
};

/// Convenient result alias that reuses the shared ConoHa error type.
pub type Result<T> = conoha_core::Result<T>;
