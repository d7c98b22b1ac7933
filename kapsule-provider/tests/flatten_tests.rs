mod common;

use std::collections::HashMap;

use common::{cluster, fr_par, pool, provider};
use kapsule_api::memory::MemoryK8sApi;
use kapsule_models::{
    AutoUpgrade, AutoscalerConfig, AutoscalerEstimator, AutoscalerExpander,
    ClusterStatus, MaintenanceWindow, MaintenanceWindowDay, Node, NodeStatus,
    OpenIdConnectConfig, PoolStatus, PoolUpgradePolicy,
};
use kapsule_provider::ProviderError;
use kapsule_provider::flatten::*;
use serde_json::{Value, json};

fn node(name: &str, v4: Option<&str>, v6: Option<&str>) -> Node {
    Node {
        id: format!("id-{name}"),
        pool_id: "p1".into(),
        cluster_id: "c1".into(),
        region: fr_par(),
        name: name.into(),
        status: NodeStatus::Ready,
        public_ip_v4: v4.map(|a| a.parse().unwrap()),
        public_ip_v6: v6.map(|a| a.parse().unwrap()),
    }
}

fn autoscaler() -> AutoscalerConfig {
    AutoscalerConfig {
        scale_down_disabled: true,
        scale_down_delay_after_add: "10m".into(),
        estimator: AutoscalerEstimator::Binpacking,
        expander: AutoscalerExpander::MostPods,
        ignore_daemonsets_utilization: true,
        balance_similar_node_groups: false,
        expendable_pods_priority_cutoff: -10,
        scale_down_unneeded_time: "5m".into(),
        scale_down_utilization_threshold: 0.77,
        max_graceful_termination_sec: 600,
    }
}

#[test]
fn autoscaler_block() {
    let mut c = cluster("c1", ClusterStatus::Ready);
    c.autoscaler_config = autoscaler();

    let block = flatten_autoscaler_config(&c).into_list();
    assert_eq!(block.len(), 1);
    assert_eq!(
        Value::Object(block[0].clone()),
        json!({
            "disable_scale_down": true,
            "scale_down_delay_after_add": "10m",
            "scale_down_unneeded_time": "5m",
            "estimator": "binpacking",
            "expander": "most_pods",
            "ignore_daemonsets_utilization": true,
            "balance_similar_node_groups": false,
            "expendable_pods_priority_cutoff": -10,
            "scale_down_utilization_threshold": 0.77,
            "max_graceful_termination_sec": 600,
        })
    );
}

#[test]
fn autoscaler_threshold_is_widened_through_text() {
    let mut c = cluster("c1", ClusterStatus::Ready);
    c.autoscaler_config.scale_down_utilization_threshold = 0.1;
    let block = flatten_autoscaler_config(&c);
    let threshold = block.get().unwrap()["scale_down_utilization_threshold"]
        .as_f64()
        .unwrap();
    assert_eq!(threshold, 0.1f64);
    assert_ne!(threshold, 0.1f32 as f64);
}

#[test]
fn autoscaler_block_fails_closed() {
    let mut c = cluster("c1", ClusterStatus::Ready);
    c.autoscaler_config.scale_down_utilization_threshold = f32::NAN;
    let block = flatten_autoscaler_config(&c);
    assert!(block.is_absent());
    assert!(block.into_list().is_empty());
}

#[test]
fn autoscaler_round_trip() {
    let mut c = cluster("c1", ClusterStatus::Ready);
    c.autoscaler_config = autoscaler();
    let raw: Value = flatten_autoscaler_config(&c).into();
    assert_eq!(expand_autoscaler_config(&raw).unwrap(), Some(autoscaler()));
    assert_eq!(expand_autoscaler_config(&json!([])).unwrap(), None);
    assert!(matches!(
        expand_autoscaler_config(&json!([{"expander": "cheapest"}])),
        Err(ProviderError::MalformedInput(_))
    ));
}

#[test]
fn open_id_connect_block() {
    let mut c = cluster("c1", ClusterStatus::Ready);
    c.open_id_connect_config = OpenIdConnectConfig {
        issuer_url: "https://accounts.example.com".into(),
        client_id: "kapsule".into(),
        username_claim: "email".into(),
        username_prefix: "oidc:".into(),
        groups_claim: vec!["groups".into()],
        groups_prefix: "oidc:".into(),
        required_claim: vec![],
    };
    let raw: Value = flatten_open_id_connect_config(&c).into();
    assert_eq!(
        raw,
        json!([{
            "issuer_url": "https://accounts.example.com",
            "client_id": "kapsule",
            "username_claim": "email",
            "username_prefix": "oidc:",
            "groups_claim": ["groups"],
            "groups_prefix": "oidc:",
            "required_claim": [],
        }])
    );
    assert_eq!(
        expand_open_id_connect_config(&raw).unwrap(),
        Some(c.open_id_connect_config.clone())
    );
}

#[test]
fn auto_upgrade_block() {
    let mut c = cluster("c1", ClusterStatus::Ready);
    c.auto_upgrade = AutoUpgrade {
        enabled: true,
        maintenance_window: MaintenanceWindow {
            start_hour: 3,
            day: MaintenanceWindowDay::Sunday,
        },
    };
    let raw: Value = flatten_auto_upgrade(&c).into();
    assert_eq!(
        raw,
        json!([{
            "enable": true,
            "maintenance_window_start_hour": 3,
            "maintenance_window_day": "sunday",
        }])
    );
    assert_eq!(expand_auto_upgrade(&raw).unwrap(), Some(c.auto_upgrade.clone()));
    assert!(matches!(
        expand_auto_upgrade(&json!([{"maintenance_window_start_hour": "three"}])),
        Err(ProviderError::MalformedInput(_))
    ));
}

#[test]
fn absent_upgrade_policy_is_one_empty_block() {
    let p = pool("c1", "p1", PoolStatus::Ready);
    assert!(p.upgrade_policy.is_none());
    let block = flatten_pool_upgrade_policy(&p).into_list();
    assert_eq!(block.len(), 1);
    assert!(block[0].is_empty());

    let raw = Value::from(flatten_pool_upgrade_policy(&p));
    assert_eq!(expand_pool_upgrade_policy(&raw).unwrap(), None);
}

#[test]
fn upgrade_policy_block() {
    let mut p = pool("c1", "p1", PoolStatus::Ready);
    p.upgrade_policy = Some(PoolUpgradePolicy {
        max_surge: 2,
        max_unavailable: 1,
    });
    let raw: Value = flatten_pool_upgrade_policy(&p).into();
    assert_eq!(raw, json!([{"max_surge": 2, "max_unavailable": 1}]));
    assert_eq!(expand_pool_upgrade_policy(&raw).unwrap(), p.upgrade_policy);
    assert!(matches!(
        expand_pool_upgrade_policy(&json!([{"max_surge": -1}])),
        Err(ProviderError::MalformedInput(_))
    ));
}

#[test]
fn nodes_omit_missing_addresses() {
    let nodes = vec![
        node("node-1", Some("51.15.0.1"), None),
        node("node-2", Some("51.15.0.2"), Some("::")),
        node("node-3", Some("0.0.0.0"), Some("2001:bc8:1::1")),
    ];
    let out: Vec<Value> = convert_nodes(&nodes).into_iter().map(Value::Object).collect();
    assert_eq!(
        out,
        vec![
            json!({"name": "node-1", "status": "ready", "public_ip": "51.15.0.1"}),
            json!({"name": "node-2", "status": "ready", "public_ip": "51.15.0.2"}),
            json!({"name": "node-3", "status": "ready", "public_ip_v6": "2001:bc8:1::1"}),
        ]
    );
}

#[test]
fn kubelet_args_round_trip() {
    let mut args = HashMap::new();
    args.insert("maxPods".to_string(), "110".to_string());
    args.insert("cpuManagerPolicy".to_string(), "static".to_string());
    args.insert("empty".to_string(), String::new());

    let flat = flatten_kubelet_args(&args);
    assert_eq!(flat.len(), 3);
    assert_eq!(flat["maxPods"], json!("110"));
    assert_eq!(expand_kubelet_args(&Value::Object(flat)).unwrap(), args);

    assert!(flatten_kubelet_args(&HashMap::new()).is_empty());
    assert_eq!(expand_kubelet_args(&Value::Null).unwrap(), HashMap::new());
}

#[test]
fn kubelet_args_reject_non_strings() {
    let err = expand_kubelet_args(&json!({"maxPods": 110})).unwrap_err();
    assert!(matches!(err, ProviderError::MalformedInput(ref m) if m.contains("maxPods")));
    assert!(matches!(
        expand_kubelet_args(&json!(["maxPods"])),
        Err(ProviderError::MalformedInput(_))
    ));
}

#[tokio::test]
async fn pool_nodes_are_read_across_pages() {
    let api = MemoryK8sApi::new();
    let p = pool("c1", "p1", PoolStatus::Ready);
    api.put_nodes((0..75).map(|i| node(&format!("node-{i}"), Some("51.15.0.1"), None)))
        .await;
    let mut foreign = node("elsewhere", None, None);
    foreign.pool_id = "p2".into();
    api.put_nodes([foreign]).await;

    let nodes = provider(&api).get_nodes(&p).await.unwrap();
    assert_eq!(nodes.len(), 75);
    assert_eq!(nodes[0]["name"], json!("node-0"));
    assert_eq!(nodes[74]["name"], json!("node-74"));
}
