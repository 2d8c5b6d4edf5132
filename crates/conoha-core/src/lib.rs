//! # conoha-core
//!
//! Core plumbing shared by every ConoHa VPS v3 service crate.
//!
//! This crate owns the pieces that make a bare HTTP endpoint usable as a typed
//! method call: a bearer token that refreshes itself, a base URL for each
//! logical service, and a single request path that maps HTTP failures onto a
//! small error taxonomy.
//!
//! ## Modules
//!
//! - [`error`] - Error types and HTTP status code mapping
//! - [`config`] - Client configuration and validation
//! - [`endpoint`] - Logical services and the endpoint precedence chain
//! - [`auth`] - Credentials and the token manager
//! - [`client`] - Request executor and per-service client handle
//! - [`query`] - Query parameter builder

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod query;

// Re-export commonly used types
pub use auth::{Credentials, ProjectScope, TokenManager, UserRef};
pub use client::{ApiRequest, ServiceClient, Session};
pub use config::ConohaConfig;
pub use endpoint::{EndpointResolver, Service};
pub use error::{ApiError, Error, Result};
