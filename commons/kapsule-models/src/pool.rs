use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::region::Region;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PoolStatus {
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "ready")]
    Ready,
    #[serde(rename = "deleting")]
    Deleting,
    #[serde(rename = "deleted")]
    Deleted,
    #[serde(rename = "scaling")]
    Scaling,
    #[serde(rename = "warning")]
    Warning,
    #[serde(rename = "locked")]
    Locked,
    #[serde(rename = "upgrading")]
    Upgrading,
}

impl PoolStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolStatus::Unknown => "unknown",
            PoolStatus::Ready => "ready",
            PoolStatus::Deleting => "deleting",
            PoolStatus::Deleted => "deleted",
            PoolStatus::Scaling => "scaling",
            PoolStatus::Warning => "warning",
            PoolStatus::Locked => "locked",
            PoolStatus::Upgrading => "upgrading",
        }
    }

    /// Statuses at which a pool transition is over.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PoolStatus::Ready
                | PoolStatus::Warning
                | PoolStatus::Locked
                | PoolStatus::Deleted
        )
    }

    /// Terminal statuses of a pool that still serves its cluster.
    pub fn is_stable(&self) -> bool {
        matches!(
            self,
            PoolStatus::Ready | PoolStatus::Warning | PoolStatus::Locked
        )
    }
}

impl Default for PoolStatus {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PoolUpgradePolicy {
    pub max_surge: u32,
    pub max_unavailable: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub id: String,
    pub cluster_id: String,
    pub region: Region,
    pub name: String,
    pub status: PoolStatus,
    pub version: String,
    pub node_type: String,
    pub size: u32,
    pub min_size: u32,
    pub max_size: u32,
    #[serde(default)]
    pub autoscaling: bool,
    #[serde(default)]
    pub autohealing: bool,
    #[serde(default)]
    pub container_runtime: String,
    #[serde(default)]
    pub kubelet_args: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_policy: Option<PoolUpgradePolicy>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub zone: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Pool {
    pub fn new(
        region: Region,
        cluster_id: impl Into<String>,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let zone = format!("{region}-1");
        Self {
            id: id.into(),
            cluster_id: cluster_id.into(),
            region,
            name: name.into(),
            status: PoolStatus::Scaling,
            version: String::new(),
            node_type: "DEV1-M".into(),
            size: 1,
            min_size: 1,
            max_size: 1,
            autoscaling: false,
            autohealing: false,
            container_runtime: "containerd".into(),
            kubelet_args: HashMap::new(),
            upgrade_policy: None,
            tags: vec![],
            zone,
            created_at: Some(Utc::now()),
            updated_at: None,
        }
    }

    pub fn with_status(mut self, status: PoolStatus) -> Self {
        self.status = status;
        self
    }
}
