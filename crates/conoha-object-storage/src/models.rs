//! Object storage models.
//!
//! Account and container statistics come from `X-Account-*` and
//! `X-Container-*` response headers rather than a JSON body.

use conoha_core::query::QueryParams;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// Account statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountInfo {
    /// Number of containers.
    pub container_count: Option<u64>,
    /// Number of objects across all containers.
    pub object_count: Option<u64>,
    /// Bytes stored.
    pub bytes_used: Option<u64>,
    /// Quota in gigabytes, when one is set.
    pub quota_giga_bytes: Option<u64>,
}

impl AccountInfo {
    /// Read the `X-Account-*` headers of a HEAD response.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            container_count: header_u64(headers, "x-account-container-count"),
            object_count: header_u64(headers, "x-account-object-count"),
            bytes_used: header_u64(headers, "x-account-bytes-used"),
            quota_giga_bytes: header_u64(headers, "x-account-meta-quota-giga-bytes"),
        }
    }
}

/// Container statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContainerMetadata {
    /// Number of objects.
    pub object_count: Option<u64>,
    /// Logical bytes stored.
    pub bytes_used: Option<u64>,
    /// Bytes stored on disk.
    pub bytes_used_actual: Option<u64>,
}

impl ContainerMetadata {
    /// Read the `X-Container-*` headers of a HEAD response.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            object_count: header_u64(headers, "x-container-object-count"),
            bytes_used: header_u64(headers, "x-container-bytes-used"),
            bytes_used_actual: header_u64(headers, "x-container-bytes-used-actual"),
        }
    }
}

/// Collect every header as lowercase name to value.
///
/// Values that are not valid UTF-8 are skipped; repeated headers keep the
/// last value.
#[must_use]
pub fn headers_to_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}

/// Container listing entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Container {
    /// Container name.
    pub name: String,
    /// Number of objects.
    #[serde(default)]
    pub count: u64,
    /// Bytes stored.
    #[serde(default)]
    pub bytes: u64,
    /// Last modification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    /// Fields not modelled above, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Object listing entry.
///
/// With a `delimiter`, grouped prefixes come back as entries that only carry
/// `subdir`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Object name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// MD5 of the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    /// Content type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Last modification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    /// Pseudo-directory prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdir: Option<String>,
    /// Fields not modelled above, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ObjectEntry {
    /// True for a pseudo-directory entry.
    #[must_use]
    pub const fn is_subdir(&self) -> bool {
        self.subdir.is_some()
    }
}

/// Paging and filtering shared by container and object listings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListParams {
    /// Page size.
    pub limit: Option<u32>,
    /// Return names after this one.
    pub marker: Option<String>,
    /// Return names before this one.
    pub end_marker: Option<String>,
    /// Name prefix.
    pub prefix: Option<String>,
    /// Group names on this character.
    pub delimiter: Option<String>,
    /// Reverse the order.
    pub reverse: Option<bool>,
}

impl ListParams {
    /// Convert to URL query pairs. `format=json` is always first.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = QueryParams::new();
        params.push("format", "json");
        params.push_opt("limit", self.limit);
        params.push_non_empty("marker", self.marker.as_deref());
        params.push_non_empty("end_marker", self.end_marker.as_deref());
        params.push_non_empty("prefix", self.prefix.as_deref());
        params.push_non_empty("delimiter", self.delimiter.as_deref());
        params.push_opt("reverse", self.reverse);
        params.into_pairs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn account_info_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-account-container-count", HeaderValue::from_static("3"));
        headers.insert("x-account-object-count", HeaderValue::from_static("42"));
        headers.insert("x-account-bytes-used", HeaderValue::from_static("1048576"));

        let info = AccountInfo::from_headers(&headers);
        assert_eq!(info.container_count, Some(3));
        assert_eq!(info.object_count, Some(42));
        assert_eq!(info.bytes_used, Some(1_048_576));
        assert_eq!(info.quota_giga_bytes, None);
    }

    #[test]
    fn list_params_always_request_json() {
        assert_eq!(
            ListParams::default().to_pairs(),
            vec![("format", "json".to_string())]
        );

        let params = ListParams {
            prefix: Some("logs/".into()),
            delimiter: Some("/".into()),
            reverse: Some(true),
            ..ListParams::default()
        };
        assert_eq!(
            params.to_pairs(),
            vec![
                ("format", "json".to_string()),
                ("prefix", "logs/".to_string()),
                ("delimiter", "/".to_string()),
                ("reverse", "true".to_string()),
            ]
        );
    }
}
