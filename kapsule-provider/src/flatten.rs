//! Conversion between API objects and the flat attribute form stored by the
//! configuration layer.
//!
//! Nested blocks travel as a list holding at most one map; [`NestedBlock`]
//! keeps that shape.

use std::collections::HashMap;

use kapsule_models::{
    AutoUpgrade, AutoscalerConfig, AutoscalerEstimator, AutoscalerExpander,
    Cluster, MaintenanceWindow, MaintenanceWindowDay, Node, OpenIdConnectConfig,
    Pool, PoolUpgradePolicy,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};
use tracing::warn;

use crate::error::ProviderError;

pub type AttrMap = serde_json::Map<String, Value>;

/// An optional nested block: zero or one attribute map, never more.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NestedBlock(Option<AttrMap>);

impl NestedBlock {
    pub fn single(map: AttrMap) -> Self {
        Self(Some(map))
    }

    pub fn absent() -> Self {
        Self(None)
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    pub fn get(&self) -> Option<&AttrMap> {
        self.0.as_ref()
    }

    pub fn into_inner(self) -> Option<AttrMap> {
        self.0
    }

    pub fn into_list(self) -> Vec<AttrMap> {
        self.0.into_iter().collect()
    }

    pub fn from_list(list: Vec<AttrMap>) -> Result<Self, ProviderError> {
        if list.len() > 1 {
            return Err(ProviderError::MalformedInput(format!(
                "expected at most one block, got {}",
                list.len()
            )));
        }
        Ok(Self(list.into_iter().next()))
    }

    /// Read a block from its raw list form. `null` counts as absent.
    pub fn from_value(raw: &Value) -> Result<Self, ProviderError> {
        match raw {
            Value::Null => Ok(Self::absent()),
            Value::Array(items) => {
                let mut maps = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Object(map) => maps.push(map.clone()),
                        other => {
                            return Err(ProviderError::MalformedInput(format!(
                                "block entry must be an object, got {other}"
                            )));
                        }
                    }
                }
                Self::from_list(maps)
            }
            other => Err(ProviderError::MalformedInput(format!(
                "block must be a list, got {other}"
            ))),
        }
    }
}

impl From<NestedBlock> for Value {
    fn from(block: NestedBlock) -> Self {
        Value::Array(block.into_list().into_iter().map(Value::Object).collect())
    }
}

impl Serialize for NestedBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de> Deserialize<'de> for NestedBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let list = Vec::<AttrMap>::deserialize(deserializer)?;
        NestedBlock::from_list(list).map_err(serde::de::Error::custom)
    }
}

/// Widen an `f32` through its shortest decimal text so the `f64` carries
/// the digits the user wrote, not the binary noise of a direct cast.
pub fn widen_f32(value: f32) -> Option<f64> {
    value.to_string().parse::<f64>().ok()
}

pub fn flatten_autoscaler_config(cluster: &Cluster) -> NestedBlock {
    let conf = &cluster.autoscaler_config;
    let threshold = match widen_f32(conf.scale_down_utilization_threshold)
        .and_then(Number::from_f64)
    {
        Some(n) => n,
        None => {
            warn!(
                cluster = %cluster.id,
                threshold = %conf.scale_down_utilization_threshold,
                "dropping autoscaler block, utilization threshold is not representable"
            );
            return NestedBlock::absent();
        }
    };

    let mut m = AttrMap::new();
    m.insert("disable_scale_down".into(), conf.scale_down_disabled.into());
    m.insert(
        "scale_down_delay_after_add".into(),
        conf.scale_down_delay_after_add.clone().into(),
    );
    m.insert(
        "scale_down_unneeded_time".into(),
        conf.scale_down_unneeded_time.clone().into(),
    );
    m.insert("estimator".into(), conf.estimator.as_str().into());
    m.insert("expander".into(), conf.expander.as_str().into());
    m.insert(
        "ignore_daemonsets_utilization".into(),
        conf.ignore_daemonsets_utilization.into(),
    );
    m.insert(
        "balance_similar_node_groups".into(),
        conf.balance_similar_node_groups.into(),
    );
    m.insert(
        "expendable_pods_priority_cutoff".into(),
        conf.expendable_pods_priority_cutoff.into(),
    );
    m.insert("scale_down_utilization_threshold".into(), Value::Number(threshold));
    m.insert(
        "max_graceful_termination_sec".into(),
        conf.max_graceful_termination_sec.into(),
    );
    NestedBlock::single(m)
}

pub fn flatten_open_id_connect_config(cluster: &Cluster) -> NestedBlock {
    let conf = &cluster.open_id_connect_config;
    let mut m = AttrMap::new();
    m.insert("issuer_url".into(), conf.issuer_url.clone().into());
    m.insert("client_id".into(), conf.client_id.clone().into());
    m.insert("username_claim".into(), conf.username_claim.clone().into());
    m.insert("username_prefix".into(), conf.username_prefix.clone().into());
    m.insert("groups_claim".into(), conf.groups_claim.clone().into());
    m.insert("groups_prefix".into(), conf.groups_prefix.clone().into());
    m.insert("required_claim".into(), conf.required_claim.clone().into());
    NestedBlock::single(m)
}

pub fn flatten_auto_upgrade(cluster: &Cluster) -> NestedBlock {
    let conf = &cluster.auto_upgrade;
    let mut m = AttrMap::new();
    m.insert("enable".into(), conf.enabled.into());
    m.insert(
        "maintenance_window_start_hour".into(),
        conf.maintenance_window.start_hour.into(),
    );
    m.insert(
        "maintenance_window_day".into(),
        conf.maintenance_window.day.as_str().into(),
    );
    NestedBlock::single(m)
}

/// An absent policy still yields a block, empty, meaning "API defaults".
pub fn flatten_pool_upgrade_policy(pool: &Pool) -> NestedBlock {
    let mut m = AttrMap::new();
    if let Some(policy) = &pool.upgrade_policy {
        m.insert("max_surge".into(), policy.max_surge.into());
        m.insert("max_unavailable".into(), policy.max_unavailable.into());
    }
    NestedBlock::single(m)
}

pub fn convert_nodes(nodes: &[Node]) -> Vec<AttrMap> {
    nodes
        .iter()
        .map(|node| {
            let mut m = AttrMap::new();
            m.insert("name".into(), node.name.clone().into());
            m.insert("status".into(), node.status.to_string().into());
            if let Some(ip) = node.public_ip_v4_text() {
                m.insert("public_ip".into(), ip.into());
            }
            if let Some(ip) = node.public_ip_v6_text() {
                m.insert("public_ip_v6".into(), ip.into());
            }
            m
        })
        .collect()
}

pub fn flatten_kubelet_args(args: &HashMap<String, String>) -> AttrMap {
    args.iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}

pub fn expand_kubelet_args(raw: &Value) -> Result<HashMap<String, String>, ProviderError> {
    let map = match raw {
        Value::Null => return Ok(HashMap::new()),
        Value::Object(map) => map,
        other => {
            return Err(ProviderError::MalformedInput(format!(
                "kubelet_args must be a map, got {other}"
            )));
        }
    };
    map.iter()
        .map(|(k, v)| match v {
            Value::String(s) => Ok((k.clone(), s.clone())),
            other => Err(ProviderError::MalformedInput(format!(
                "kubelet_args.{k} must be a string, got {other}"
            ))),
        })
        .collect()
}

pub fn expand_autoscaler_config(
    raw: &Value,
) -> Result<Option<AutoscalerConfig>, ProviderError> {
    let Some(m) = NestedBlock::from_value(raw)?.into_inner() else {
        return Ok(None);
    };
    let mut conf = AutoscalerConfig::default();
    if let Some(v) = read_bool(&m, "disable_scale_down")? {
        conf.scale_down_disabled = v;
    }
    if let Some(v) = read_string(&m, "scale_down_delay_after_add")? {
        conf.scale_down_delay_after_add = v;
    }
    if let Some(v) = read_string(&m, "scale_down_unneeded_time")? {
        conf.scale_down_unneeded_time = v;
    }
    if let Some(v) = read_string(&m, "estimator")? {
        conf.estimator = AutoscalerEstimator::parse(&v).ok_or_else(|| {
            ProviderError::MalformedInput(format!("unknown estimator {v}"))
        })?;
    }
    if let Some(v) = read_string(&m, "expander")? {
        conf.expander = AutoscalerExpander::parse(&v).ok_or_else(|| {
            ProviderError::MalformedInput(format!("unknown expander {v}"))
        })?;
    }
    if let Some(v) = read_bool(&m, "ignore_daemonsets_utilization")? {
        conf.ignore_daemonsets_utilization = v;
    }
    if let Some(v) = read_bool(&m, "balance_similar_node_groups")? {
        conf.balance_similar_node_groups = v;
    }
    if let Some(v) = read_i64(&m, "expendable_pods_priority_cutoff")? {
        conf.expendable_pods_priority_cutoff = narrow(v, "expendable_pods_priority_cutoff")?;
    }
    if let Some(v) = read_f64(&m, "scale_down_utilization_threshold")? {
        conf.scale_down_utilization_threshold = v as f32;
    }
    if let Some(v) = read_i64(&m, "max_graceful_termination_sec")? {
        conf.max_graceful_termination_sec = narrow(v, "max_graceful_termination_sec")?;
    }
    Ok(Some(conf))
}

pub fn expand_open_id_connect_config(
    raw: &Value,
) -> Result<Option<OpenIdConnectConfig>, ProviderError> {
    let Some(m) = NestedBlock::from_value(raw)?.into_inner() else {
        return Ok(None);
    };
    Ok(Some(OpenIdConnectConfig {
        issuer_url: read_string(&m, "issuer_url")?.unwrap_or_default(),
        client_id: read_string(&m, "client_id")?.unwrap_or_default(),
        username_claim: read_string(&m, "username_claim")?.unwrap_or_default(),
        username_prefix: read_string(&m, "username_prefix")?.unwrap_or_default(),
        groups_claim: read_string_list(&m, "groups_claim")?.unwrap_or_default(),
        groups_prefix: read_string(&m, "groups_prefix")?.unwrap_or_default(),
        required_claim: read_string_list(&m, "required_claim")?.unwrap_or_default(),
    }))
}

pub fn expand_auto_upgrade(raw: &Value) -> Result<Option<AutoUpgrade>, ProviderError> {
    let Some(m) = NestedBlock::from_value(raw)?.into_inner() else {
        return Ok(None);
    };
    let day = match read_string(&m, "maintenance_window_day")? {
        Some(v) => MaintenanceWindowDay::parse(&v).ok_or_else(|| {
            ProviderError::MalformedInput(format!("unknown maintenance day {v}"))
        })?,
        None => MaintenanceWindowDay::default(),
    };
    let start_hour = match read_i64(&m, "maintenance_window_start_hour")? {
        Some(v) => narrow(v, "maintenance_window_start_hour")?,
        None => 0,
    };
    Ok(Some(AutoUpgrade {
        enabled: read_bool(&m, "enable")?.unwrap_or(false),
        maintenance_window: MaintenanceWindow { start_hour, day },
    }))
}

/// An empty block maps to `None`, the counterpart of
/// [`flatten_pool_upgrade_policy`] for a pool without policy.
pub fn expand_pool_upgrade_policy(
    raw: &Value,
) -> Result<Option<PoolUpgradePolicy>, ProviderError> {
    let Some(m) = NestedBlock::from_value(raw)?.into_inner() else {
        return Ok(None);
    };
    let surge = read_i64(&m, "max_surge")?;
    let unavailable = read_i64(&m, "max_unavailable")?;
    if surge.is_none() && unavailable.is_none() {
        return Ok(None);
    }
    Ok(Some(PoolUpgradePolicy {
        max_surge: narrow(surge.unwrap_or(0), "max_surge")?,
        max_unavailable: narrow(unavailable.unwrap_or(0), "max_unavailable")?,
    }))
}

fn field<'a>(m: &'a AttrMap, key: &str) -> Option<&'a Value> {
    m.get(key).filter(|v| !v.is_null())
}

fn mistyped(key: &str, want: &str, got: &Value) -> ProviderError {
    ProviderError::MalformedInput(format!("{key} must be {want}, got {got}"))
}

fn read_bool(m: &AttrMap, key: &str) -> Result<Option<bool>, ProviderError> {
    field(m, key)
        .map(|v| v.as_bool().ok_or_else(|| mistyped(key, "a bool", v)))
        .transpose()
}

fn read_string(m: &AttrMap, key: &str) -> Result<Option<String>, ProviderError> {
    field(m, key)
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| mistyped(key, "a string", v))
        })
        .transpose()
}

fn read_i64(m: &AttrMap, key: &str) -> Result<Option<i64>, ProviderError> {
    field(m, key)
        .map(|v| v.as_i64().ok_or_else(|| mistyped(key, "an integer", v)))
        .transpose()
}

fn read_f64(m: &AttrMap, key: &str) -> Result<Option<f64>, ProviderError> {
    field(m, key)
        .map(|v| v.as_f64().ok_or_else(|| mistyped(key, "a number", v)))
        .transpose()
}

fn read_string_list(m: &AttrMap, key: &str) -> Result<Option<Vec<String>>, ProviderError> {
    let Some(v) = field(m, key) else {
        return Ok(None);
    };
    let items = v.as_array().ok_or_else(|| mistyped(key, "a list", v))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| mistyped(key, "a list of strings", item))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn narrow<T: TryFrom<i64>>(v: i64, key: &str) -> Result<T, ProviderError> {
    T::try_from(v)
        .map_err(|_| ProviderError::MalformedInput(format!("{key} is out of range: {v}")))
}
