use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::region::Region;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "creating")]
    Creating,
    #[serde(rename = "not_ready")]
    NotReady,
    #[serde(rename = "ready")]
    Ready,
    #[serde(rename = "deleting")]
    Deleting,
    #[serde(rename = "deleted")]
    Deleted,
    #[serde(rename = "locked")]
    Locked,
    #[serde(rename = "rebooting")]
    Rebooting,
    #[serde(rename = "creation_error")]
    CreationError,
    #[serde(rename = "upgrading")]
    Upgrading,
    #[serde(rename = "starting")]
    Starting,
    #[serde(rename = "registering")]
    Registering,
}

impl NodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::Unknown => "unknown",
            NodeStatus::Creating => "creating",
            NodeStatus::NotReady => "not_ready",
            NodeStatus::Ready => "ready",
            NodeStatus::Deleting => "deleting",
            NodeStatus::Deleted => "deleted",
            NodeStatus::Locked => "locked",
            NodeStatus::Rebooting => "rebooting",
            NodeStatus::CreationError => "creation_error",
            NodeStatus::Upgrading => "upgrading",
            NodeStatus::Starting => "starting",
            NodeStatus::Registering => "registering",
        }
    }
}

impl Default for NodeStatus {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of a pool. Only ever read, never mutated through this crate.
///
/// The API reports a missing public address either by omitting it or by
/// sending the unspecified address (`0.0.0.0` / `::`); see
/// [`Node::public_ip_v4_text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub pool_id: String,
    pub cluster_id: String,
    pub region: Region,
    pub name: String,
    pub status: NodeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_ip_v4: Option<IpAddr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_ip_v6: Option<IpAddr>,
}

impl Node {
    pub fn public_ip_v4_text(&self) -> Option<String> {
        address_text(self.public_ip_v4.as_ref())
    }

    pub fn public_ip_v6_text(&self) -> Option<String> {
        address_text(self.public_ip_v6.as_ref())
    }
}

fn address_text(addr: Option<&IpAddr>) -> Option<String> {
    addr.filter(|a| !a.is_unspecified()).map(IpAddr::to_string)
}
