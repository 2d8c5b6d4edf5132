//! DNS models.

use conoha_core::query::QueryParams;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Hosted domain (zone).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Domain {
    /// Domain id.
    pub id: String,
    /// Fully qualified name with trailing dot, e.g. `example.com.`.
    pub name: String,
    /// Default TTL in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Administrative contact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// SOA serial.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<u64>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Fields not modelled above, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request payload for registering a domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateDomainRequest {
    /// Name with trailing dot.
    pub name: String,
    /// Default TTL in seconds.
    pub ttl: u32,
    /// Administrative contact.
    pub email: String,
}

/// Domain update; unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateDomainRequest {
    /// New TTL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// New contact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Paging and ordering for domain listings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DomainListParams {
    /// Page size.
    pub limit: Option<u32>,
    /// Offset of the first domain.
    pub offset: Option<u32>,
    /// `asc` or `desc`.
    pub sort_type: Option<String>,
    /// Sort key, e.g. `name`.
    pub sort_key: Option<String>,
}

impl DomainListParams {
    /// Convert to URL query pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = QueryParams::new();
        params.push_opt("limit", self.limit);
        params.push_opt("offset", self.offset);
        params.push_non_empty("sort_type", self.sort_type.as_deref());
        params.push_non_empty("sort_key", self.sort_key.as_deref());
        params.into_pairs()
    }
}

/// Resource record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    /// Record id.
    pub id: String,
    /// Owner name.
    pub name: String,
    /// Record type such as `A`, `MX` or `TXT`.
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record data.
    pub data: String,
    /// TTL in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Priority for `MX` and `SRV`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    /// Owning domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Fields not modelled above, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request payload for creating a record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateRecordRequest {
    /// Owner name.
    pub name: String,
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record data.
    pub data: String,
    /// TTL in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Priority for `MX` and `SRV`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
}

impl CreateRecordRequest {
    /// Record with the domain's default TTL and no priority.
    pub fn new(
        name: impl Into<String>,
        record_type: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
            data: data.into(),
            ttl: None,
            priority: None,
        }
    }

    /// Set the TTL.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Set the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Record update; unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateRecordRequest {
    /// New owner name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// New TTL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// New priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_request_renames_type() {
        let request = CreateRecordRequest::new("mail.example.com.", "MX", "mx.example.com.")
            .with_priority(10);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "name": "mail.example.com.",
                "type": "MX",
                "data": "mx.example.com.",
                "priority": 10
            })
        );
    }

    #[test]
    fn list_params_keep_zero_offset() {
        let params = DomainListParams {
            offset: Some(0),
            sort_type: Some(String::new()),
            ..DomainListParams::default()
        };
        assert_eq!(params.to_pairs(), vec![("offset", "0".to_string())]);
    }

    #[test]
    fn record_keeps_service_fields() {
        let body = json!({
            "id": "rec-1",
            "name": "www.example.com.",
            "type": "A",
            "data": "203.0.113.10",
            "ttl": 3600,
            "gslb_check": 0,
            "status": "ACTIVE",
            "version": 2
        });
        let record: Record = serde_json::from_value(body.clone()).unwrap();

        assert_eq!(record.record_type, "A");
        assert_eq!(record.extra["status"], "ACTIVE");
        assert!(!record.extra.contains_key("ttl"));
        assert_eq!(serde_json::to_value(&record).unwrap(), body);
    }
}
