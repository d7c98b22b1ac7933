use std::time::Duration;

use envconfig::Envconfig;

pub const CLUSTER_WAIT_TIMEOUT: Duration = Duration::from_secs(10 * 60);
pub const CLUSTER_POOL_WAIT_TIMEOUT: Duration = Duration::from_secs(10 * 60);
pub const CLUSTER_DELETE_WAIT_TIMEOUT: Duration = Duration::from_secs(10 * 60);
pub const POOL_READY_WAIT_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Pause between two reads of a converging resource, shared by every waiter.
pub const DEFAULT_WAIT_RETRY_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Default, Envconfig)]
pub struct ProviderConfig {
    /// Overrides [`DEFAULT_WAIT_RETRY_INTERVAL`]. Mostly useful to replay
    /// recorded API sessions without sleeping. Zero means the default.
    #[envconfig(from = "KAPSULE_WAIT_RETRY_INTERVAL_MS")]
    pub wait_retry_interval_ms: Option<u64>,
}

impl ProviderConfig {
    /// Sub-millisecond intervals are rounded up to one millisecond.
    pub fn with_retry_interval(interval: Duration) -> Self {
        let ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        let ms = if ms == 0 && !interval.is_zero() { 1 } else { ms };
        Self {
            wait_retry_interval_ms: Some(ms),
        }
    }

    #[inline]
    pub fn retry_interval(&self) -> Duration {
        self.wait_retry_interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_WAIT_RETRY_INTERVAL)
    }
}
