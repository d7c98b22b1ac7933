use kapsule_models::{Pool, PoolStatus, Region};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{Poller, ResourceKind};
use crate::config::POOL_READY_WAIT_TIMEOUT;
use crate::error::ProviderError;
use crate::provider::KapsuleProvider;

impl KapsuleProvider {
    /// Wait for a pool to settle and require that it settled as `ready`.
    pub async fn wait_pool_ready(
        &self,
        region: &Region,
        pool_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Pool, ProviderError> {
        let api = self.api();
        info!(pool = %pool_id, region = %region, "waiting for pool");
        let pool = Poller::new(ResourceKind::Pool, pool_id, cancel.clone())
            .desired(PoolStatus::Ready.as_str())
            .timeout(POOL_READY_WAIT_TIMEOUT)
            .retry_interval(self.retry_interval())
            .run(
                || api.get_pool(region, pool_id),
                |p: &Pool| p.status.is_terminal(),
                |p: &Pool| p.status.to_string(),
            )
            .await?
            .into_observed(ResourceKind::Pool, pool_id)?;

        if pool.status != PoolStatus::Ready {
            return Err(ProviderError::UnexpectedTerminalState {
                resource: ResourceKind::Pool,
                id: pool_id.to_string(),
                observed: pool.status.to_string(),
                expected: PoolStatus::Ready.to_string(),
            });
        }
        Ok(pool)
    }
}
