//! Compute models shared by the client and its tests.

use conoha_core::query::QueryParams;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Hypermedia link attached to most compute resources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    /// Target URL.
    pub href: String,
    /// Relation (`self`, `bookmark`).
    pub rel: String,
}

/// Server as returned by the list, detail and create calls.
///
/// The minimal listing only carries `id`, `name` and `links`; everything else
/// is populated by the detail endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Server {
    /// Server id.
    pub id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Lifecycle status such as `ACTIVE` or `SHUTOFF`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Resource links.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    /// Flavor reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<Value>,
    /// Image reference; an empty string for volume-booted servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Value>,
    /// Addresses keyed by network name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addresses: Option<HashMap<String, Vec<Address>>>,
    /// User metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
    /// Keypair injected at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    /// Owning project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Creating user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    /// Security groups by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_groups: Option<Vec<SecurityGroupName>>,
    /// Root password, only present in the create response.
    #[serde(
        rename = "adminPass",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub admin_pass: Option<String>,
    /// Power state code.
    #[serde(
        rename = "OS-EXT-STS:power_state",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub power_state: Option<i64>,
    /// VM state.
    #[serde(
        rename = "OS-EXT-STS:vm_state",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub vm_state: Option<String>,
    /// Task in progress.
    #[serde(
        rename = "OS-EXT-STS:task_state",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub task_state: Option<String>,
    /// Attached volumes.
    #[serde(
        rename = "os-extended-volumes:volumes_attached",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub volumes_attached: Option<Vec<Value>>,
    /// Fields not modelled above, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One address of a server on a network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    /// IP address.
    pub addr: String,
    /// IP version (4 or 6).
    pub version: u8,
    /// `fixed` or `floating`.
    #[serde(
        rename = "OS-EXT-IPS:type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub ip_type: Option<String>,
    /// MAC address of the port.
    #[serde(
        rename = "OS-EXT-IPS-MAC:mac_addr",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub mac_addr: Option<String>,
}

/// Security group reference by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecurityGroupName {
    /// Group name.
    pub name: String,
}

/// Security group as listed for a server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSecurityGroup {
    /// Group id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Group name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owning project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Value>,
    /// Fields not modelled above, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Boot volume reference for server creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockDeviceMapping {
    /// Volume id.
    pub uuid: String,
}

/// Metadata required by server creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerNameTag {
    /// Name shown in the control panel.
    pub instance_name_tag: String,
}

/// Request payload for creating a server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateServerRequest {
    /// Flavor id.
    #[serde(rename = "flavorRef")]
    pub flavor_ref: String,
    /// Root password.
    #[serde(rename = "adminPass")]
    pub admin_pass: String,
    /// Boot volume.
    pub block_device_mapping_v2: Vec<BlockDeviceMapping>,
    /// Name tag metadata.
    pub metadata: ServerNameTag,
    /// SSH keypair name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    /// Base64 encoded cloud-init user data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    /// Security groups to attach.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_groups: Option<Vec<SecurityGroupName>>,
}

impl CreateServerRequest {
    /// Create a request booting from `volume_id`.
    #[must_use]
    pub fn new(
        flavor_id: impl Into<String>,
        admin_pass: impl Into<String>,
        volume_id: impl Into<String>,
        instance_name_tag: impl Into<String>,
    ) -> Self {
        Self {
            flavor_ref: flavor_id.into(),
            admin_pass: admin_pass.into(),
            block_device_mapping_v2: vec![BlockDeviceMapping {
                uuid: volume_id.into(),
            }],
            metadata: ServerNameTag {
                instance_name_tag: instance_name_tag.into(),
            },
            key_name: None,
            user_data: None,
            security_groups: None,
        }
    }

    /// Inject an SSH keypair.
    #[must_use]
    pub fn with_key_name(mut self, key_name: impl Into<String>) -> Self {
        self.key_name = Some(key_name.into());
        self
    }

    /// Attach cloud-init user data (already base64 encoded).
    #[must_use]
    pub fn with_user_data(mut self, user_data: impl Into<String>) -> Self {
        self.user_data = Some(user_data.into());
        self
    }

    /// Attach security groups by name.
    #[must_use]
    pub fn with_security_groups<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let groups: Vec<SecurityGroupName> = names
            .into_iter()
            .map(|name| SecurityGroupName { name: name.into() })
            .collect();
        self.security_groups = (!groups.is_empty()).then_some(groups);
        self
    }
}

/// Reboot mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RebootType {
    /// Graceful reboot.
    #[default]
    Soft,
    /// Power cycle.
    Hard,
}

/// Hardware settings changed through `setServerSettings`.
///
/// Unset fields are left out of the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerSettings {
    /// Video model, e.g. `vga` or `cirrus`.
    #[serde(
        rename = "hwVideoModel",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub hw_video_model: Option<String>,
    /// NIC model, e.g. `virtio` or `e1000`.
    #[serde(
        rename = "hwVifModel",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub hw_vif_model: Option<String>,
    /// Disk bus, e.g. `virtio` or `ide`.
    #[serde(
        rename = "hwDiskBus",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub hw_disk_bus: Option<String>,
}

/// Remote console access.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteConsole {
    /// Console protocol.
    pub protocol: String,
    /// Console type such as `novnc`.
    #[serde(rename = "type")]
    pub console_type: String,
    /// Browser URL.
    pub url: String,
    /// Fields not modelled above, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Flavor (plan).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flavor {
    /// Flavor id.
    pub id: String,
    /// Flavor name, e.g. `g2l-t-c2m1`.
    pub name: String,
    /// Memory in MiB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram: Option<u64>,
    /// Virtual CPUs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcpus: Option<u32>,
    /// Root disk in GiB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<u64>,
    /// Whether the flavor is public.
    #[serde(
        rename = "os-flavor-access:is_public",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_public: Option<bool>,
    /// Resource links.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    /// Fields not modelled above, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// SSH keypair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Keypair {
    /// Keypair name.
    pub name: String,
    /// OpenSSH public key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    /// Key fingerprint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// Private key, only returned when the server generated the pair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    /// Owning user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Fields not modelled above, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Keypair listings nest every entry under its own `keypair` key.
#[derive(Debug, Deserialize)]
pub(crate) struct KeypairEntry {
    pub keypair: Keypair,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateKeypairRequest<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<&'a str>,
}

/// Fixed IP of an attached port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FixedIp {
    /// Address.
    pub ip_address: String,
    /// Subnet id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
}

/// Port attached to a server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterfaceAttachment {
    /// Port id.
    pub port_id: String,
    /// Network id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_id: Option<String>,
    /// MAC address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_addr: Option<String>,
    /// Port state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_state: Option<String>,
    /// Fixed IPs on the port.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixed_ips: Vec<FixedIp>,
    /// Fields not modelled above, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Volume attached to a server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolumeAttachment {
    /// Attachment id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Volume id.
    #[serde(rename = "volumeId")]
    pub volume_id: String,
    /// Server id.
    #[serde(rename = "serverId", default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    /// Guest device path, e.g. `/dev/vdb`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Fields not modelled above, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Time series returned by the monitoring endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Graph {
    /// Column names; the first is the timestamp.
    #[serde(default)]
    pub schema: Vec<String>,
    /// Rows aligned with `schema`. Gaps come back as `null`.
    #[serde(default)]
    pub data: Vec<Vec<Value>>,
    /// Fields not modelled above, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Time window for monitoring graphs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GraphParams {
    /// Start as a unix timestamp.
    pub start_date_raw: Option<i64>,
    /// End as a unix timestamp.
    pub end_date_raw: Option<i64>,
    /// Aggregation mode, e.g. `average` or `max`.
    pub mode: Option<String>,
}

impl GraphParams {
    /// Convert to URL query pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = QueryParams::new();
        params.push_opt("start_date_raw", self.start_date_raw);
        params.push_opt("end_date_raw", self.end_date_raw);
        params.push_non_empty("mode", self.mode.as_deref());
        params.into_pairs()
    }
}
