//! # conoha
//!
//! Typed client for the ConoHa VPS v3 API.
//!
//! [`ConohaClient`] owns one authenticated session and hands out a client per
//! service. Each service client is created on first use and shares the
//! session's token, so a re-authentication triggered by one service is seen
//! by all of them.
//!
//! ```no_run
//! # async fn run() -> conoha::Result<()> {
//! let client = conoha::ConohaClient::builder()
//!     .username("api-user")
//!     .password("api-password")
//!     .tenant_id("tenant-id")
//!     .build()
//!     .await?;
//!
//! for server in client.compute().list_servers().await? {
//!     println!("{}", server.id);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod client;

pub use client::{ConohaClient, ConohaClientBuilder};
pub use conoha_core::{ApiError, ConohaConfig, Error, Result, Service, Session};

pub use conoha_compute as compute;
pub use conoha_dns as dns;
pub use conoha_identity as identity;
pub use conoha_image as image;
pub use conoha_loadbalancer as load_balancer;
pub use conoha_network as network;
pub use conoha_object_storage as object_storage;
pub use conoha_volume as volume;
