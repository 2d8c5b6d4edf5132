//! Block storage API client for ConoHa VPS v3.
//!
//! Every path is scoped to the project: `/v3/{tenant_id}/...`. The project id
//! comes from the configured scope or from the last authentication.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::VolumeClient;
pub use models::{
    Backup, BackupListParams, BackupRestore, BackupSchedule, CreateVolumeRequest,
    UpdateVolumeRequest, Volume, VolumeImageUpload, VolumeType,
};

/// Convenient result alias that reuses the shared ConoHa error type.
pub type Result<T> = conoha_core::Result<T>;
