use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("failed to fetch page {page}: {source}")]
    FetchFailed { page: u32, source: anyhow::Error },
    #[error("failed to delete record {id}: {source}")]
    DeleteFailed { id: String, source: anyhow::Error },
    #[error("invalid page {page}: pages are numbered from 1")]
    InvalidPage { page: u32 },
}
