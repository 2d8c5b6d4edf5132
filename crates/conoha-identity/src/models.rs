//! Identity models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// EC2-compatible access key pair bound to a user and project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ec2Credential {
    /// Access key (also the credential id).
    pub access: String,
    /// Secret key.
    pub secret: String,
    /// Project the credential is scoped to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Owning user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Trust id, if issued through a trust.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_id: Option<String>,
    /// Resource links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
    /// Fields not modelled above, kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateCredentialRequest<'a> {
    pub tenant_id: &'a str,
}
