use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};

use anyhow::Context;
use kapsule_api::memory::{Frame, MemoryK8sApi};
use kapsule_models::{
    AutoscalerConfig, Cluster, ClusterStatus, MaintenanceWindowDay, Node,
    NodeStatus, Pool, PoolStatus, PoolUpgradePolicy, Region, Version,
};
use kapsule_provider::flatten::{
    flatten_auto_upgrade, flatten_autoscaler_config, flatten_kubelet_args,
    flatten_open_id_connect_config, flatten_pool_upgrade_policy,
};
use kapsule_provider::{CancellationToken, KapsuleProvider};
use serde_json::{Value, json};
use tracing::info;

const CATALOG: [&str; 4] = ["1.31.2", "1.30.6", "1.29.10", "1.28.15"];

#[derive(clap::Args, Clone, Debug)]
pub struct SimulateArgs {
    /// Minor Kubernetes version to deploy
    #[arg(short, long, default_value = "1.30")]
    pub version: String,
    /// Number of transitional reads before each resource settles
    #[arg(short, long, default_value_t = 2)]
    pub steps: usize,
    /// Node count of the default pool
    #[arg(short, long, default_value_t = 3)]
    pub nodes: u8,
    /// Kubelet arguments. Example `-k maxPods=110 -k cpuManagerPolicy=static`
    #[arg(short, long)]
    pub kubelet_arg: Vec<String>,
    #[arg(long)]
    pub max_surge: Option<u32>,
    #[arg(long)]
    pub max_unavailable: Option<u32>,
    /// Leave the cluster in place instead of deleting it afterwards
    #[arg(long)]
    pub keep: bool,
}

fn parse_kubelet_args(raw: &[String]) -> anyhow::Result<HashMap<String, String>> {
    raw.iter()
        .map(|kv| {
            let (k, v) = kv
                .split_once('=')
                .with_context(|| format!("kubelet arg must be key=value, got {kv}"))?;
            Ok((k.to_string(), v.to_string()))
        })
        .collect()
}

fn frames<T: Clone>(transitional: T, settled: T, steps: usize) -> Vec<Frame<T>> {
    let mut out: Vec<Frame<T>> = std::iter::repeat_n(transitional, steps)
        .map(Frame::Present)
        .collect();
    out.push(Frame::Present(settled));
    out
}

pub async fn simulate(
    provider: &KapsuleProvider,
    api: &MemoryK8sApi,
    region: &Region,
    opt: &SimulateArgs,
    cancel: &CancellationToken,
) -> anyhow::Result<Value> {
    let catalog = CATALOG
        .iter()
        .map(|name| Version::new(region.clone(), *name))
        .collect();
    api.set_versions(region.clone(), catalog).await;
    let version = provider.resolve_latest_version(region, &opt.version).await?;

    let stamp = chrono::Utc::now().timestamp();
    let cluster_id = format!("sim-cluster-{stamp}");
    let pool_id = format!("sim-pool-{stamp}");
    info!("simulating cluster {} with version {}", cluster_id, version);

    let mut cluster = Cluster::new(region.clone(), &cluster_id, "sim");
    cluster.version = version.to_string();
    cluster.autoscaler_config = AutoscalerConfig {
        scale_down_delay_after_add: "10m".into(),
        scale_down_unneeded_time: "10m".into(),
        scale_down_utilization_threshold: 0.5,
        max_graceful_termination_sec: 600,
        ..Default::default()
    };
    cluster.auto_upgrade.enabled = true;
    cluster.auto_upgrade.maintenance_window.start_hour = 3;
    cluster.auto_upgrade.maintenance_window.day = MaintenanceWindowDay::Sunday;

    let mut pool = Pool::new(region.clone(), &cluster_id, &pool_id, "default");
    pool.version = cluster.version.clone();
    pool.size = opt.nodes as u32;
    pool.kubelet_args = parse_kubelet_args(&opt.kubelet_arg)?;
    if opt.max_surge.is_some() || opt.max_unavailable.is_some() {
        pool.upgrade_policy = Some(PoolUpgradePolicy {
            max_surge: opt.max_surge.unwrap_or(0),
            max_unavailable: opt.max_unavailable.unwrap_or(1),
        });
    }

    api.script_cluster(
        &cluster_id,
        frames(
            cluster.clone().with_status(ClusterStatus::Creating),
            cluster.clone().with_status(ClusterStatus::Ready),
            opt.steps,
        ),
    )
    .await;
    api.script_pool(
        &pool_id,
        frames(
            pool.clone().with_status(PoolStatus::Scaling),
            pool.clone().with_status(PoolStatus::Ready),
            opt.steps,
        ),
    )
    .await;
    api.put_nodes((0..opt.nodes).map(|i| Node {
        id: format!("{pool_id}-node-{i}"),
        pool_id: pool_id.clone(),
        cluster_id: cluster_id.clone(),
        region: region.clone(),
        name: format!("scw-sim-default-{i}"),
        status: NodeStatus::Ready,
        public_ip_v4: Some(IpAddr::V4(Ipv4Addr::new(51, 15, 0, i.saturating_add(1)))),
        public_ip_v6: None,
    }))
    .await;

    let cluster = provider.wait_cluster_pool(region, &cluster_id, cancel).await?;
    let pool = provider.wait_pool_ready(region, &pool_id, cancel).await?;
    let nodes = provider.get_nodes(&pool).await?;

    let mut out = json!({
        "cluster": {
            "id": format!("{}/{}", cluster.region, cluster.id),
            "version": cluster.version,
            "status": cluster.status.to_string(),
            "autoscaler_config": flatten_autoscaler_config(&cluster),
            "open_id_connect_config": flatten_open_id_connect_config(&cluster),
            "auto_upgrade": flatten_auto_upgrade(&cluster),
        },
        "pool": {
            "id": format!("{}/{}", pool.region, pool.id),
            "status": pool.status.to_string(),
            "kubelet_args": flatten_kubelet_args(&pool.kubelet_args),
            "upgrade_policy": flatten_pool_upgrade_policy(&pool),
            "nodes": nodes,
        },
    });

    if !opt.keep {
        let mut deleting = frames(
            cluster.clone().with_status(ClusterStatus::Deleting),
            cluster.clone().with_status(ClusterStatus::Deleting),
            opt.steps.saturating_sub(1),
        );
        deleting.push(Frame::Gone);
        api.script_cluster(&cluster_id, deleting).await;
        provider.wait_cluster_deleted(region, &cluster_id, cancel).await?;
        info!("cluster {} deleted", cluster_id);
        out["deleted"] = Value::Bool(true);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kapsule_provider::ProviderConfig;
    use std::sync::Arc;
    use std::time::Duration;

    fn args() -> SimulateArgs {
        SimulateArgs {
            version: "1.29".into(),
            steps: 2,
            nodes: 2,
            kubelet_arg: vec!["maxPods=110".into()],
            max_surge: Some(2),
            max_unavailable: None,
            keep: false,
        }
    }

    #[test]
    fn kubelet_args_need_a_separator() {
        assert!(parse_kubelet_args(&["maxPods".into()]).is_err());
        let parsed = parse_kubelet_args(&["a=b=c".into()]).unwrap();
        assert_eq!(parsed["a"], "b=c");
    }

    #[tokio::test]
    async fn simulation_converges_and_projects() {
        let api = MemoryK8sApi::new();
        let provider = KapsuleProvider::new(
            Arc::new(api.clone()),
            ProviderConfig::with_retry_interval(Duration::from_millis(5)),
        );
        let out = simulate(
            &provider,
            &api,
            &Region::new("fr-par"),
            &args(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(out["cluster"]["version"], json!("1.29.10"));
        assert_eq!(out["cluster"]["status"], json!("ready"));
        assert_eq!(out["cluster"]["auto_upgrade"][0]["maintenance_window_day"], json!("sunday"));
        assert_eq!(
            out["cluster"]["autoscaler_config"][0]["scale_down_utilization_threshold"],
            json!(0.5)
        );
        assert_eq!(out["pool"]["status"], json!("ready"));
        assert_eq!(out["pool"]["kubelet_args"], json!({"maxPods": "110"}));
        assert_eq!(
            out["pool"]["upgrade_policy"],
            json!([{"max_surge": 2, "max_unavailable": 1}])
        );
        assert_eq!(out["pool"]["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(out["pool"]["nodes"][1]["public_ip"], json!("51.15.0.2"));
        assert_eq!(out["deleted"], json!(true));
    }
}
