//! Image API client for ConoHa VPS v3.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::ImageClient;
pub use models::{Image, ImageListParams, ImageQuota, ImageUsage};

/// Convenient result alias that reuses the shared ConoHa error type.
pub type Result<T> = conoha_core::Result<T>;
