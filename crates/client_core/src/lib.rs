use anyhow::Result;
use async_trait::async_trait;
use shared::protocol::PageResponse;

mod controller;
pub mod error;
pub mod transport;
pub mod types;

pub use controller::PagedCollectionController;
pub use error::CollectionError;
pub use transport::HttpCollectionApi;
pub use types::{CollectionEvent, PageState, DEFAULT_PAGE_SIZE};

/// Remote side of a paginated collection.
///
/// Implementations perform exactly one request per call and never retry.
#[async_trait]
pub trait CollectionApi<R>: Send + Sync {
    async fn fetch_page(&self, page: u32) -> Result<PageResponse<R>>;
    async fn delete(&self, id: &str) -> Result<()>;
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod controller_tests;

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod transport_tests;
