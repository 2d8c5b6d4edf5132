//! DNS API client for ConoHa VPS v3.
//!
//! Unlike the OpenStack services, single-resource responses from the DNS
//! service carry no envelope key.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::DnsClient;
pub use models::{
    CreateDomainRequest, CreateRecordRequest, Domain, DomainListParams, Record,
    UpdateDomainRequest, UpdateRecordRequest,
};

/// Convenient result alias that reuses the shared ConoHa error type.
pub type Result<T> = conoha_core::Result<T>;
