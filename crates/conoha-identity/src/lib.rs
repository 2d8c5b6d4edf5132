//! Identity API client for ConoHa VPS v3.
//!
//! Token issuance lives in [`conoha_core::auth`]; this crate covers the
//! remaining identity resources, currently the EC2-style credentials used by
//! object storage tooling.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::IdentityClient;
pub use models::Ec2Credential;

/// Convenient result alias that reuses the shared ConoHa error type.
pub type Result<T> = conoha_core::Result<T>;
