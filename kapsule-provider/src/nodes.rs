use kapsule_api::{ApiError, DEFAULT_PAGE_SIZE, K8sApi, ListNodesRequest, collect_all_pages};
use kapsule_models::{Node, Pool};

use crate::error::ProviderError;
use crate::flatten::{AttrMap, convert_nodes};
use crate::provider::KapsuleProvider;

/// Every node of `pool`, across all pages.
pub async fn list_pool_nodes(
    api: &dyn K8sApi,
    pool: &Pool,
) -> Result<Vec<Node>, ApiError> {
    collect_all_pages(DEFAULT_PAGE_SIZE, |page| {
        let req = ListNodesRequest {
            region: pool.region.clone(),
            cluster_id: pool.cluster_id.clone(),
            pool_id: Some(pool.id.clone()),
            page,
        };
        async move { api.list_nodes(&req).await }
    })
    .await
}

impl KapsuleProvider {
    /// Nodes of `pool` in attribute form.
    pub async fn get_nodes(&self, pool: &Pool) -> Result<Vec<AttrMap>, ProviderError> {
        let nodes = list_pool_nodes(self.api(), pool).await?;
        Ok(convert_nodes(&nodes))
    }
}
