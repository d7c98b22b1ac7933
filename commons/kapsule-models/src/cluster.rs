use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::region::Region;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ClusterStatus {
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "creating")]
    Creating,
    #[serde(rename = "ready")]
    Ready,
    #[serde(rename = "deleting")]
    Deleting,
    #[serde(rename = "deleted")]
    Deleted,
    #[serde(rename = "updating")]
    Updating,
    #[serde(rename = "locked")]
    Locked,
    #[serde(rename = "pool_required")]
    PoolRequired,
}

impl ClusterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterStatus::Unknown => "unknown",
            ClusterStatus::Creating => "creating",
            ClusterStatus::Ready => "ready",
            ClusterStatus::Deleting => "deleting",
            ClusterStatus::Deleted => "deleted",
            ClusterStatus::Updating => "updating",
            ClusterStatus::Locked => "locked",
            ClusterStatus::PoolRequired => "pool_required",
        }
    }

    /// Statuses at which a cluster transition is over.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ClusterStatus::Ready
                | ClusterStatus::Locked
                | ClusterStatus::Deleted
                | ClusterStatus::PoolRequired
        )
    }
}

impl Default for ClusterStatus {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AutoscalerEstimator {
    #[serde(rename = "unknown_estimator")]
    Unknown,
    #[serde(rename = "binpacking")]
    Binpacking,
}

impl AutoscalerEstimator {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutoscalerEstimator::Unknown => "unknown_estimator",
            AutoscalerEstimator::Binpacking => "binpacking",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unknown_estimator" => Some(Self::Unknown),
            "binpacking" => Some(Self::Binpacking),
            _ => None,
        }
    }
}

impl Default for AutoscalerEstimator {
    fn default() -> Self {
        Self::Binpacking
    }
}

impl fmt::Display for AutoscalerEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AutoscalerExpander {
    #[serde(rename = "unknown_expander")]
    Unknown,
    #[serde(rename = "random")]
    Random,
    #[serde(rename = "most_pods")]
    MostPods,
    #[serde(rename = "least_waste")]
    LeastWaste,
    #[serde(rename = "priority")]
    Priority,
    #[serde(rename = "price")]
    Price,
}

impl AutoscalerExpander {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutoscalerExpander::Unknown => "unknown_expander",
            AutoscalerExpander::Random => "random",
            AutoscalerExpander::MostPods => "most_pods",
            AutoscalerExpander::LeastWaste => "least_waste",
            AutoscalerExpander::Priority => "priority",
            AutoscalerExpander::Price => "price",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unknown_expander" => Some(Self::Unknown),
            "random" => Some(Self::Random),
            "most_pods" => Some(Self::MostPods),
            "least_waste" => Some(Self::LeastWaste),
            "priority" => Some(Self::Priority),
            "price" => Some(Self::Price),
            _ => None,
        }
    }
}

impl Default for AutoscalerExpander {
    fn default() -> Self {
        Self::Random
    }
}

impl fmt::Display for AutoscalerExpander {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MaintenanceWindowDay {
    #[serde(rename = "any")]
    Any,
    #[serde(rename = "monday")]
    Monday,
    #[serde(rename = "tuesday")]
    Tuesday,
    #[serde(rename = "wednesday")]
    Wednesday,
    #[serde(rename = "thursday")]
    Thursday,
    #[serde(rename = "friday")]
    Friday,
    #[serde(rename = "saturday")]
    Saturday,
    #[serde(rename = "sunday")]
    Sunday,
}

impl MaintenanceWindowDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceWindowDay::Any => "any",
            MaintenanceWindowDay::Monday => "monday",
            MaintenanceWindowDay::Tuesday => "tuesday",
            MaintenanceWindowDay::Wednesday => "wednesday",
            MaintenanceWindowDay::Thursday => "thursday",
            MaintenanceWindowDay::Friday => "friday",
            MaintenanceWindowDay::Saturday => "saturday",
            MaintenanceWindowDay::Sunday => "sunday",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "any" => Some(Self::Any),
            "monday" => Some(Self::Monday),
            "tuesday" => Some(Self::Tuesday),
            "wednesday" => Some(Self::Wednesday),
            "thursday" => Some(Self::Thursday),
            "friday" => Some(Self::Friday),
            "saturday" => Some(Self::Saturday),
            "sunday" => Some(Self::Sunday),
            _ => None,
        }
    }
}

impl Default for MaintenanceWindowDay {
    fn default() -> Self {
        Self::Any
    }
}

impl fmt::Display for MaintenanceWindowDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AutoscalerConfig {
    pub scale_down_disabled: bool,
    pub scale_down_delay_after_add: String,
    pub estimator: AutoscalerEstimator,
    pub expander: AutoscalerExpander,
    pub ignore_daemonsets_utilization: bool,
    pub balance_similar_node_groups: bool,
    pub expendable_pods_priority_cutoff: i32,
    pub scale_down_unneeded_time: String,
    pub scale_down_utilization_threshold: f32,
    pub max_graceful_termination_sec: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OpenIdConnectConfig {
    pub issuer_url: String,
    pub client_id: String,
    pub username_claim: String,
    pub username_prefix: String,
    pub groups_claim: Vec<String>,
    pub groups_prefix: String,
    pub required_claim: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MaintenanceWindow {
    pub start_hour: u32,
    pub day: MaintenanceWindowDay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AutoUpgrade {
    pub enabled: bool,
    pub maintenance_window: MaintenanceWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub region: Region,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: ClusterStatus,
    pub version: String,
    pub cni: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub cluster_url: String,
    #[serde(default)]
    pub dns_wildcard: String,
    #[serde(default)]
    pub autoscaler_config: AutoscalerConfig,
    #[serde(default)]
    pub open_id_connect_config: OpenIdConnectConfig,
    #[serde(default)]
    pub auto_upgrade: AutoUpgrade,
    #[serde(default)]
    pub upgrade_available: bool,
    #[serde(default)]
    pub feature_gates: Vec<String>,
    #[serde(default)]
    pub admission_plugins: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Cluster {
    pub fn new(region: Region, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            region,
            name: name.into(),
            description: String::new(),
            status: ClusterStatus::Creating,
            version: String::new(),
            cni: "cilium".into(),
            tags: vec![],
            cluster_url: String::new(),
            dns_wildcard: String::new(),
            autoscaler_config: AutoscalerConfig::default(),
            open_id_connect_config: OpenIdConnectConfig::default(),
            auto_upgrade: AutoUpgrade::default(),
            upgrade_available: false,
            feature_gates: vec![],
            admission_plugins: vec![],
            created_at: Some(Utc::now()),
            updated_at: None,
        }
    }

    pub fn with_status(mut self, status: ClusterStatus) -> Self {
        self.status = status;
        self
    }
}
