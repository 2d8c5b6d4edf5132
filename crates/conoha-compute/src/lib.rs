//! Compute API client and data models for ConoHa VPS v3.
//!
//! Covers server lifecycle and power actions, metadata, addresses, remote
//! consoles, flavors, SSH keypairs, port and volume attachments, and the
//! per-server monitoring graphs.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::ComputeClient;
pub use models::{
    Address, CreateServerRequest, Flavor, Graph, GraphParams, InterfaceAttachment, Keypair,
    RebootType, RemoteConsole, Server, ServerSecurityGroup, ServerSettings, VolumeAttachment,
};

/// Convenient result alias that reuses the shared ConoHa error type.
pub type Result<T> = conoha_core::Result<T>;
