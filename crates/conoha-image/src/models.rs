//! Image models.

use conoha_core::query::QueryParams;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Image record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Image {
    /// Image id.
    pub id: String,
    /// Name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Status such as `queued` or `active`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// `public`, `private` or `shared`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    /// Disk format, e.g. `qcow2` or `iso`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_format: Option<String>,
    /// Container format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_format: Option<String>,
    /// Size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Minimum disk in GiB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_disk: Option<u64>,
    /// Minimum memory in MiB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_ram: Option<u64>,
    /// OS family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_type: Option<String>,
    /// Owning project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Data upload path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Self link.
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    /// Fields not modelled above, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of the ISO image registration call.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub(crate) struct CreateIsoImageRequest<'a> {
    pub name: &'a str,
    pub disk_format: &'static str,
    pub hw_rescue_bus: &'static str,
    pub hw_rescue_device: &'static str,
    pub container_format: &'static str,
}

impl<'a> CreateIsoImageRequest<'a> {
    pub(crate) const fn new(name: &'a str) -> Self {
        Self {
            name,
            disk_format: "iso",
            hw_rescue_bus: "ide",
            hw_rescue_device: "cdrom",
            container_format: "bare",
        }
    }
}

/// Storage used by saved images.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageUsage {
    /// Bytes in use.
    #[serde(default)]
    pub size: u64,
    /// Fields not modelled above, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Image storage quota.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageQuota {
    /// Quota as sent by the service, e.g. `"550GB"`.
    pub image_size: String,
    /// Fields not modelled above, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageQuota {
    /// Quota in gigabytes, if the value has the usual `<n>GB` shape.
    #[must_use]
    pub fn size_gb(&self) -> Option<u64> {
        self.image_size.strip_suffix("GB")?.trim().parse().ok()
    }
}

/// Filters and paging for image listings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImageListParams {
    /// Page size.
    pub limit: Option<u32>,
    /// Id of the last image of the previous page.
    pub marker: Option<String>,
    /// `public`, `private` or `shared`.
    pub visibility: Option<String>,
    /// OS family, e.g. `linux` or `windows`.
    pub os_type: Option<String>,
    /// Sort key.
    pub sort_key: Option<String>,
    /// `asc` or `desc`.
    pub sort_dir: Option<String>,
    /// Exact name.
    pub name: Option<String>,
    /// Status.
    pub status: Option<String>,
}

impl ImageListParams {
    /// Convert to URL query pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = QueryParams::new();
        params.push_opt("limit", self.limit);
        params.push_non_empty("marker", self.marker.as_deref());
        params.push_non_empty("visibility", self.visibility.as_deref());
        params.push_non_empty("os_type", self.os_type.as_deref());
        params.push_non_empty("sort_key", self.sort_key.as_deref());
        params.push_non_empty("sort_dir", self.sort_dir.as_deref());
        params.push_non_empty("name", self.name.as_deref());
        params.push_non_empty("status", self.status.as_deref());
        params.into_pairs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_size_parses_gigabytes() {
        let quota = ImageQuota {
            image_size: "550GB".into(),
            extra: Map::new(),
        };
        assert_eq!(quota.size_gb(), Some(550));

        let odd = ImageQuota {
            image_size: "unlimited".into(),
            extra: Map::new(),
        };
        assert_eq!(odd.size_gb(), None);
    }

    #[test]
    fn list_params_skip_blank_values() {
        let params = ImageListParams {
            limit: Some(20),
            visibility: Some("private".into()),
            name: Some(String::new()),
            ..ImageListParams::default()
        };
        assert_eq!(
            params.to_pairs(),
            vec![
                ("limit", "20".to_string()),
                ("visibility", "private".to_string())
            ]
        );
    }
}
