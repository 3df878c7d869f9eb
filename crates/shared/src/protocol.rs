use serde::{Deserialize, Serialize};

/// One page of a remote collection as returned by `GET /{collection}/?page={n}`.
///
/// `count` is the size of the whole collection across all pages, not the
/// length of `result`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse<R> {
    pub result: Vec<R>,
    pub count: u64,
}

impl<R> PageResponse<R> {
    pub fn new(result: Vec<R>, count: u64) -> Self {
        Self { result, count }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: u32,
}
