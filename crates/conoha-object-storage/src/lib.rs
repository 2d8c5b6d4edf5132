//! Object storage API client for ConoHa VPS v3.
//!
//! The service is Swift compatible: every path lives under the account URL
//! `/v1/AUTH_<tenant_id>`, metadata travels in response headers, and objects
//! move as raw bytes. Temporary URLs are signed locally, see [`temp_url`].

#![deny(missing_docs)]

pub mod client;
pub mod models;
pub mod temp_url;

pub use client::ObjectStorageClient;
pub use models::{AccountInfo, Container, ContainerMetadata, ListParams, ObjectEntry};

/// Convenient result alias that reuses the shared ConoHa error type.
pub type Result<T> = conoha_core::Result<T>;
