use std::future::Future;

use crate::error::ApiError;

pub const DEFAULT_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn offset(&self) -> usize {
        (self.page.max(1) as usize - 1) * self.page_size.max(1) as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
}

impl<T: Clone> Page<T> {
    /// Cut one page out of a full listing.
    pub fn slice(all: &[T], req: PageRequest) -> Self {
        let items = all
            .iter()
            .skip(req.offset())
            .take(req.page_size.max(1) as usize)
            .cloned()
            .collect();
        Self {
            items,
            total_count: all.len() as u64,
        }
    }
}

/// Fetch pages until `total_count` items were collected or a page comes
/// back empty.
pub async fn collect_all_pages<T, F, Fut>(
    page_size: u32,
    mut fetch: F,
) -> Result<Vec<T>, ApiError>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>, ApiError>>,
{
    let mut items = Vec::new();
    let mut page = 1;
    loop {
        let resp = fetch(PageRequest { page, page_size }).await?;
        let received = resp.items.len();
        items.extend(resp.items);
        if received == 0 || items.len() as u64 >= resp.total_count {
            tracing::trace!(pages = page, items = items.len(), "listing exhausted");
            return Ok(items);
        }
        page += 1;
    }
}
