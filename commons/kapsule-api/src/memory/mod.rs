use async_trait::async_trait;
use kapsule_models::{Cluster, Node, Pool, Region, Version};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::ApiError;
use crate::pagination::{Page, PageRequest};
use crate::traits::*;

/// What a single read of a resource observes.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame<T> {
    Present(T),
    Gone,
    Fail(ApiError),
}

/// Successive observations of one resource. Every read consumes the head
/// frame; the last frame sticks.
#[derive(Debug)]
struct Timeline<T> {
    frames: VecDeque<Frame<T>>,
    reads: usize,
}

impl Timeline<Pool> {
    fn belongs_to(&self, region: &Region, cluster_id: &str) -> bool {
        self.frames.iter().any(|f| {
            matches!(f, Frame::Present(p) if p.cluster_id == cluster_id && &p.region == region)
        })
    }
}

impl<T: Clone> Timeline<T> {
    fn new(frames: Vec<Frame<T>>) -> Self {
        Self {
            frames: frames.into(),
            reads: 0,
        }
    }

    fn next(&mut self) -> Frame<T> {
        self.reads += 1;
        if self.frames.len() > 1 {
            self.frames.pop_front().unwrap_or(Frame::Gone)
        } else {
            self.frames.front().cloned().unwrap_or(Frame::Gone)
        }
    }
}

type MemoryStore<T> = Arc<Mutex<HashMap<String, Timeline<T>>>>;

/// In-memory [`K8sApi`] whose answers are scripted per resource.
#[derive(Clone, Default)]
pub struct MemoryK8sApi {
    clusters: MemoryStore<Cluster>,
    pools: MemoryStore<Pool>,
    nodes: Arc<Mutex<Vec<Node>>>,
    versions: Arc<Mutex<HashMap<Region, Vec<Version>>>>,
    pool_listings: Arc<Mutex<HashMap<(Region, String), Vec<Pool>>>>,
    version_reads: Arc<AtomicUsize>,
}

impl MemoryK8sApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_cluster(&self, cluster: Cluster) {
        let id = cluster.id.clone();
        self.script_cluster(&id, vec![Frame::Present(cluster)]).await;
    }

    pub async fn script_cluster(&self, id: &str, frames: Vec<Frame<Cluster>>) {
        let mut store = self.clusters.lock().await;
        store.insert(id.to_string(), Timeline::new(frames));
    }

    pub async fn remove_cluster(&self, id: &str) {
        self.clusters.lock().await.remove(id);
    }

    pub async fn put_pool(&self, pool: Pool) {
        let id = pool.id.clone();
        self.script_pool(&id, vec![Frame::Present(pool)]).await;
    }

    pub async fn script_pool(&self, id: &str, frames: Vec<Frame<Pool>>) {
        let mut store = self.pools.lock().await;
        store.insert(id.to_string(), Timeline::new(frames));
    }

    pub async fn put_nodes(&self, nodes: impl IntoIterator<Item = Node>) {
        self.nodes.lock().await.extend(nodes);
    }

    pub async fn set_versions(&self, region: Region, versions: Vec<Version>) {
        self.versions.lock().await.insert(region, versions);
    }

    pub async fn cluster_reads(&self, id: &str) -> usize {
        let store = self.clusters.lock().await;
        store.get(id).map(|t| t.reads).unwrap_or(0)
    }

    pub async fn pool_reads(&self, id: &str) -> usize {
        let store = self.pools.lock().await;
        store.get(id).map(|t| t.reads).unwrap_or(0)
    }

    /// Number of catalog pages served so far.
    pub fn version_reads(&self) -> usize {
        self.version_reads.load(Ordering::SeqCst)
    }
}

fn observe<T>(
    frame: Frame<T>,
    resource: &'static str,
    id: &str,
    in_region: impl Fn(&T) -> bool,
) -> ApiResult<T> {
    match frame {
        Frame::Present(item) if in_region(&item) => Ok(item),
        Frame::Present(_) | Frame::Gone => Err(ApiError::not_found(resource, id)),
        Frame::Fail(e) => Err(e),
    }
}

#[async_trait]
impl K8sApi for MemoryK8sApi {
    async fn get_cluster(
        &self,
        region: &Region,
        cluster_id: &str,
    ) -> ApiResult<Cluster> {
        let mut store = self.clusters.lock().await;
        let frame = match store.get_mut(cluster_id) {
            Some(timeline) => timeline.next(),
            None => Frame::Gone,
        };
        debug!(cluster = %cluster_id, region = %region, "memory get_cluster");
        observe(frame, "cluster", cluster_id, |c| &c.region == region)
    }

    async fn get_pool(&self, region: &Region, pool_id: &str) -> ApiResult<Pool> {
        let mut store = self.pools.lock().await;
        let frame = match store.get_mut(pool_id) {
            Some(timeline) => timeline.next(),
            None => Frame::Gone,
        };
        debug!(pool = %pool_id, region = %region, "memory get_pool");
        observe(frame, "pool", pool_id, |p| &p.region == region)
    }

    /// The first page of a listing advances the timeline of every pool of
    /// the cluster once; the following pages are served from that snapshot.
    async fn list_pools(&self, req: &ListPoolsRequest) -> ApiResult<Page<Pool>> {
        let key = (req.region.clone(), req.cluster_id.clone());
        let mut listings = self.pool_listings.lock().await;
        if req.page.page > 1 {
            if let Some(snapshot) = listings.get(&key) {
                return Ok(Page::slice(snapshot, req.page));
            }
        }

        let mut store = self.pools.lock().await;
        let mut ids: Vec<&String> = store
            .iter()
            .filter(|(_, t)| t.belongs_to(&req.region, &req.cluster_id))
            .map(|(id, _)| id)
            .collect();
        ids.sort();
        let ids: Vec<String> = ids.into_iter().cloned().collect();

        let mut snapshot = Vec::new();
        for id in ids {
            let Some(timeline) = store.get_mut(&id) else {
                continue;
            };
            match timeline.next() {
                Frame::Present(pool)
                    if pool.cluster_id == req.cluster_id && pool.region == req.region =>
                {
                    snapshot.push(pool)
                }
                Frame::Present(_) | Frame::Gone => {}
                Frame::Fail(e) => {
                    listings.remove(&key);
                    return Err(e);
                }
            }
        }
        debug!(cluster = %req.cluster_id, pools = snapshot.len(), "memory list_pools");
        let page = Page::slice(&snapshot, req.page);
        listings.insert(key, snapshot);
        Ok(page)
    }

    async fn list_nodes(&self, req: &ListNodesRequest) -> ApiResult<Page<Node>> {
        let nodes = self.nodes.lock().await;
        let matching: Vec<Node> = nodes
            .iter()
            .filter(|n| n.region == req.region && n.cluster_id == req.cluster_id)
            .filter(|n| match &req.pool_id {
                Some(pool_id) => &n.pool_id == pool_id,
                None => true,
            })
            .cloned()
            .collect();
        Ok(Page::slice(&matching, req.page))
    }

    async fn list_versions(
        &self,
        region: &Region,
        page: PageRequest,
    ) -> ApiResult<Page<Version>> {
        self.version_reads.fetch_add(1, Ordering::SeqCst);
        let versions = self.versions.lock().await;
        let all = versions.get(region).cloned().unwrap_or_default();
        Ok(Page::slice(&all, page))
    }
}
