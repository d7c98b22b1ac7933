use async_trait::async_trait;
use kapsule_models::{Cluster, Node, Pool, Region, Version};

use crate::error::ApiError;
use crate::pagination::{Page, PageRequest};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, PartialEq)]
pub struct ListPoolsRequest {
    pub region: Region,
    pub cluster_id: String,
    pub page: PageRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListNodesRequest {
    pub region: Region,
    pub cluster_id: String,
    pub pool_id: Option<String>,
    pub page: PageRequest,
}

/// Read side of the managed Kubernetes API.
///
/// Implementations own transport concerns, including retries on transient
/// failures. A missing resource must be reported as an error for which
/// [`ApiError::is_not_found`] holds.
#[async_trait]
pub trait K8sApi: Send + Sync {
    async fn get_cluster(
        &self,
        region: &Region,
        cluster_id: &str,
    ) -> ApiResult<Cluster>;

    async fn get_pool(&self, region: &Region, pool_id: &str) -> ApiResult<Pool>;

    async fn list_pools(&self, req: &ListPoolsRequest) -> ApiResult<Page<Pool>>;

    async fn list_nodes(&self, req: &ListNodesRequest) -> ApiResult<Page<Node>>;

    /// Version catalog of a region, in the order the API ranks it.
    async fn list_versions(
        &self,
        region: &Region,
        page: PageRequest,
    ) -> ApiResult<Page<Version>>;
}
