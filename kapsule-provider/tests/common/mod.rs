#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use kapsule_api::memory::{Frame, MemoryK8sApi};
use kapsule_models::{Cluster, ClusterStatus, Pool, PoolStatus, Region};
use kapsule_provider::{KapsuleProvider, ProviderConfig};

pub const RETRY: Duration = Duration::from_millis(10);

pub fn fr_par() -> Region {
    Region::new("fr-par")
}

pub fn provider(api: &MemoryK8sApi) -> KapsuleProvider {
    KapsuleProvider::new(
        Arc::new(api.clone()),
        ProviderConfig::with_retry_interval(RETRY),
    )
}

pub fn cluster(id: &str, status: ClusterStatus) -> Cluster {
    Cluster::new(fr_par(), id, format!("k8s-{id}")).with_status(status)
}

pub fn pool(cluster_id: &str, id: &str, status: PoolStatus) -> Pool {
    Pool::new(fr_par(), cluster_id, id, format!("pool-{id}")).with_status(status)
}

pub fn cluster_frames(id: &str, statuses: &[ClusterStatus]) -> Vec<Frame<Cluster>> {
    statuses
        .iter()
        .map(|s| Frame::Present(cluster(id, *s)))
        .collect()
}

pub fn pool_frames(cluster_id: &str, id: &str, statuses: &[PoolStatus]) -> Vec<Frame<Pool>> {
    statuses
        .iter()
        .map(|s| Frame::Present(pool(cluster_id, id, *s)))
        .collect()
}
