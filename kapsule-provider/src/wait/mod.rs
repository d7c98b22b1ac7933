//! Polling until a resource settles.
//!
//! Every waiter of this crate goes through [`Poller`]: read the resource,
//! stop when the acceptance predicate holds, otherwise sleep and read again
//! until the timeout elapses or the caller cancels. Errors from the read are
//! never retried here; transient transport failures belong to the API client.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use kapsule_api::ApiError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_WAIT_RETRY_INTERVAL;
use crate::error::ProviderError;

mod cluster;
mod pool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Cluster,
    Pool,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Cluster => "cluster",
            ResourceKind::Pool => "pool",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a "not found" answer from the read is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundMode {
    /// Propagate it like any other API error.
    Fail,
    /// The resource is gone, which is what the caller waits for.
    Converged,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Converged<T> {
    /// Last snapshot read, accepted by the predicate.
    Observed(T),
    /// The resource disappeared while [`NotFoundMode::Converged`] was set.
    Absent,
}

impl<T> Converged<T> {
    pub fn into_observed(
        self,
        resource: ResourceKind,
        id: &str,
    ) -> Result<T, ProviderError> {
        match self {
            Converged::Observed(item) => Ok(item),
            Converged::Absent => {
                Err(ApiError::not_found(resource.as_str(), id).into())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Poller {
    resource: ResourceKind,
    id: String,
    desired: String,
    timeout: Duration,
    retry_interval: Duration,
    not_found: NotFoundMode,
    cancel: CancellationToken,
}

impl Poller {
    pub fn new(
        resource: ResourceKind,
        id: impl Into<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            resource,
            id: id.into(),
            desired: "ready".into(),
            timeout: crate::config::CLUSTER_WAIT_TIMEOUT,
            retry_interval: DEFAULT_WAIT_RETRY_INTERVAL,
            not_found: NotFoundMode::Fail,
            cancel,
        }
    }

    /// Status label reported in timeout errors.
    pub fn desired(mut self, desired: impl Into<String>) -> Self {
        self.desired = desired.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    pub fn not_found(mut self, mode: NotFoundMode) -> Self {
        self.not_found = mode;
        self
    }

    fn cancelled(&self) -> ProviderError {
        info!(resource = %self.resource, id = %self.id, "wait cancelled");
        ProviderError::ConvergenceCancelled {
            resource: self.resource,
            id: self.id.clone(),
        }
    }

    fn timed_out(&self, attempt: u32, observed: String) -> ProviderError {
        warn!(
            resource = %self.resource,
            id = %self.id,
            attempt,
            status = %observed,
            desired = %self.desired,
            "gave up waiting"
        );
        ProviderError::ConvergenceTimeout {
            resource: self.resource,
            id: self.id.clone(),
            observed,
            desired: self.desired.clone(),
            timeout: self.timeout,
        }
    }

    /// Read with `fetch` until `accept` holds for the snapshot.
    ///
    /// `status_of` renders the snapshot's status for logs and for the
    /// timeout error. A read still pending at the deadline is abandoned and
    /// the status of the previous read is reported.
    pub async fn run<T, F, Fut, A, S>(
        &self,
        mut fetch: F,
        accept: A,
        status_of: S,
    ) -> Result<Converged<T>, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
        A: Fn(&T) -> bool,
        S: Fn(&T) -> String,
    {
        let deadline = Instant::now() + self.timeout;
        let mut attempt: u32 = 0;
        let mut last = String::from("unknown");

        loop {
            attempt += 1;
            let read = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(self.cancelled()),
                read = fetch() => read,
                _ = tokio::time::sleep_until(deadline) => {
                    return Err(self.timed_out(attempt, last));
                }
            };

            let status = match read {
                Ok(item) => {
                    let status = status_of(&item);
                    if accept(&item) {
                        debug!(
                            resource = %self.resource,
                            id = %self.id,
                            attempt,
                            status = %status,
                            "converged"
                        );
                        return Ok(Converged::Observed(item));
                    }
                    status
                }
                Err(e)
                    if e.is_not_found()
                        && self.not_found == NotFoundMode::Converged =>
                {
                    debug!(
                        resource = %self.resource,
                        id = %self.id,
                        attempt,
                        "resource is gone"
                    );
                    return Ok(Converged::Absent);
                }
                Err(e) => return Err(e.into()),
            };

            let now = Instant::now();
            if now >= deadline {
                return Err(self.timed_out(attempt, status));
            }

            debug!(
                resource = %self.resource,
                id = %self.id,
                attempt,
                status = %status,
                "still converging"
            );
            let pause = self.retry_interval.min(deadline - now);
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(self.cancelled()),
                _ = tokio::time::sleep(pause) => {}
            }
            last = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn poller(cancel: CancellationToken) -> Poller {
        Poller::new(ResourceKind::Cluster, "c1", cancel)
            .timeout(Duration::from_millis(200))
            .retry_interval(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn returns_first_accepted_snapshot() {
        let reads = Arc::new(AtomicU32::new(0));
        let r = reads.clone();
        let out = poller(CancellationToken::new())
            .run(
                move || {
                    let n = r.fetch_add(1, Ordering::SeqCst) + 1;
                    async move { Ok::<_, ApiError>(n) }
                },
                |n: &u32| *n >= 3,
                |n: &u32| n.to_string(),
            )
            .await
            .unwrap();
        assert_eq!(out, Converged::Observed(3));
        assert_eq!(reads.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn read_errors_are_not_retried() {
        let reads = Arc::new(AtomicU32::new(0));
        let r = reads.clone();
        let err = poller(CancellationToken::new())
            .run(
                move || {
                    r.fetch_add(1, Ordering::SeqCst);
                    async { Err::<u32, _>(ApiError::Transport("reset".into())) }
                },
                |_| true,
                |n: &u32| n.to_string(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Api(ApiError::Transport(_))));
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn not_found_depends_on_mode() {
        let gone = || async { Err::<u32, _>(ApiError::not_found("cluster", "c1")) };

        let err = poller(CancellationToken::new())
            .run(gone, |_| true, |n: &u32| n.to_string())
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let out = poller(CancellationToken::new())
            .not_found(NotFoundMode::Converged)
            .run(gone, |_| true, |n: &u32| n.to_string())
            .await
            .unwrap();
        assert_eq!(out, Converged::Absent);
    }

    #[tokio::test]
    async fn timeout_reports_last_status() {
        let err = poller(CancellationToken::new())
            .desired("ready")
            .timeout(Duration::from_millis(30))
            .run(
                || async { Ok::<_, ApiError>("creating") },
                |s: &&str| *s == "ready",
                |s: &&str| s.to_string(),
            )
            .await
            .unwrap_err();
        match err {
            ProviderError::ConvergenceTimeout {
                resource,
                id,
                observed,
                desired,
                ..
            } => {
                assert_eq!(resource, ResourceKind::Cluster);
                assert_eq!(id, "c1");
                assert_eq!(observed, "creating");
                assert_eq!(desired, "ready");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn pending_read_is_abandoned_at_deadline() {
        let reads = Arc::new(AtomicU32::new(0));
        let r = reads.clone();
        let started = Instant::now();
        let err = Poller::new(ResourceKind::Cluster, "c1", CancellationToken::new())
            .timeout(Duration::from_secs(60))
            .retry_interval(Duration::from_secs(5))
            .run(
                move || {
                    let n = r.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if n > 0 {
                            tokio::time::sleep(Duration::from_secs(3600)).await;
                        }
                        Ok::<_, ApiError>("creating")
                    }
                },
                |s: &&str| *s == "ready",
                |s: &&str| s.to_string(),
            )
            .await
            .unwrap_err();

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(60) && elapsed < Duration::from_secs(61));
        assert_eq!(reads.load(Ordering::SeqCst), 2);
        assert!(matches!(
            err,
            ProviderError::ConvergenceTimeout { ref observed, .. } if observed == "creating"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_first_read_reports_unknown_status() {
        let err = poller(CancellationToken::new())
            .run(
                || std::future::pending::<Result<u32, ApiError>>(),
                |_| true,
                |n: &u32| n.to_string(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::ConvergenceTimeout { ref observed, .. } if observed == "unknown"
        ));
    }

    #[tokio::test]
    async fn cancelled_before_first_read() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = poller(cancel)
            .run(
                || async { Ok::<_, ApiError>(1u32) },
                |_| true,
                |n: &u32| n.to_string(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::ConvergenceCancelled { .. }));
    }
}
