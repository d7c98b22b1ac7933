use kapsule_api::{ApiError, DEFAULT_PAGE_SIZE, ListPoolsRequest, collect_all_pages};
use kapsule_models::{Cluster, ClusterStatus, Pool, PoolStatus, Region};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{Converged, NotFoundMode, Poller, ResourceKind};
use crate::config::{
    CLUSTER_DELETE_WAIT_TIMEOUT, CLUSTER_POOL_WAIT_TIMEOUT, CLUSTER_WAIT_TIMEOUT,
};
use crate::error::ProviderError;
use crate::provider::KapsuleProvider;

/// A cluster together with every pool it owns, read in the same poll.
struct ClusterPools {
    cluster: Cluster,
    pools: Vec<Pool>,
}

impl ClusterPools {
    /// A deleted cluster ends the wait whatever its pools report.
    fn settled(&self) -> bool {
        self.cluster.status == ClusterStatus::Deleted
            || (self.cluster.status.is_terminal() && self.first_unsettled_pool().is_none())
    }

    fn first_unsettled_pool(&self) -> Option<&Pool> {
        self.pools.iter().find(|p| !p.status.is_terminal())
    }

    fn status(&self) -> String {
        match self.first_unsettled_pool() {
            Some(pool) if self.cluster.status.is_terminal() => {
                format!("{} (pool {} {})", self.cluster.status, pool.id, pool.status)
            }
            _ => self.cluster.status.to_string(),
        }
    }

    /// Settled, but on a state that cannot serve the cluster.
    fn unexpected_state(&self) -> Option<ProviderError> {
        if self.cluster.status == ClusterStatus::Deleted {
            return Some(ProviderError::UnexpectedTerminalState {
                resource: ResourceKind::Cluster,
                id: self.cluster.id.clone(),
                observed: self.cluster.status.to_string(),
                expected: ClusterStatus::Ready.to_string(),
            });
        }
        self.pools
            .iter()
            .find(|p| !p.status.is_stable())
            .map(|p| ProviderError::UnexpectedTerminalState {
                resource: ResourceKind::Pool,
                id: p.id.clone(),
                observed: p.status.to_string(),
                expected: PoolStatus::Ready.to_string(),
            })
    }
}

impl KapsuleProvider {
    /// Wait for a cluster to leave its transitional states.
    pub async fn wait_cluster(
        &self,
        region: &Region,
        cluster_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Cluster, ProviderError> {
        let api = self.api();
        info!(cluster = %cluster_id, region = %region, "waiting for cluster");
        Poller::new(ResourceKind::Cluster, cluster_id, cancel.clone())
            .desired(ClusterStatus::Ready.as_str())
            .timeout(CLUSTER_WAIT_TIMEOUT)
            .retry_interval(self.retry_interval())
            .run(
                || api.get_cluster(region, cluster_id),
                |c: &Cluster| c.status.is_terminal(),
                |c: &Cluster| c.status.to_string(),
            )
            .await?
            .into_observed(ResourceKind::Cluster, cluster_id)
    }

    /// Wait for a cluster and for all of its pools, the required default
    /// pool included, to settle.
    pub async fn wait_cluster_pool(
        &self,
        region: &Region,
        cluster_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Cluster, ProviderError> {
        let api = self.api();
        info!(cluster = %cluster_id, region = %region, "waiting for cluster pools");
        let converged = Poller::new(ResourceKind::Cluster, cluster_id, cancel.clone())
            .desired("ready with stable pools")
            .timeout(CLUSTER_POOL_WAIT_TIMEOUT)
            .retry_interval(self.retry_interval())
            .run(
                || async move {
                    let cluster = api.get_cluster(region, cluster_id).await?;
                    let pools = collect_all_pages(DEFAULT_PAGE_SIZE, |page| {
                        let req = ListPoolsRequest {
                            region: region.clone(),
                            cluster_id: cluster_id.to_string(),
                            page,
                        };
                        async move { api.list_pools(&req).await }
                    })
                    .await?;
                    Ok::<_, ApiError>(ClusterPools { cluster, pools })
                },
                ClusterPools::settled,
                ClusterPools::status,
            )
            .await?
            .into_observed(ResourceKind::Cluster, cluster_id)?;
        match converged.unexpected_state() {
            Some(err) => Err(err),
            None => Ok(converged.cluster),
        }
    }

    /// Wait until a cluster is gone. A "not found" answer is the success
    /// case here.
    pub async fn wait_cluster_deleted(
        &self,
        region: &Region,
        cluster_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), ProviderError> {
        let api = self.api();
        info!(cluster = %cluster_id, region = %region, "waiting for cluster deletion");
        let converged = Poller::new(ResourceKind::Cluster, cluster_id, cancel.clone())
            .desired(ClusterStatus::Deleted.as_str())
            .timeout(CLUSTER_DELETE_WAIT_TIMEOUT)
            .retry_interval(self.retry_interval())
            .not_found(NotFoundMode::Converged)
            .run(
                || api.get_cluster(region, cluster_id),
                |c: &Cluster| c.status.is_terminal(),
                |c: &Cluster| c.status.to_string(),
            )
            .await?;

        match converged {
            Converged::Absent => Ok(()),
            Converged::Observed(c) if c.status == ClusterStatus::Deleted => Ok(()),
            Converged::Observed(c) => Err(ProviderError::UnexpectedTerminalState {
                resource: ResourceKind::Cluster,
                id: cluster_id.to_string(),
                observed: c.status.to_string(),
                expected: ClusterStatus::Deleted.to_string(),
            }),
        }
    }
}
