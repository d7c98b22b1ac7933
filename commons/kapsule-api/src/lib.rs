pub mod error;
#[cfg(feature = "memory")]
pub mod memory;
pub mod pagination;
pub mod traits;

pub use error::ApiError;
pub use pagination::{DEFAULT_PAGE_SIZE, Page, PageRequest, collect_all_pages};
pub use traits::*;
