use std::{marker::PhantomData, time::Duration};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    error::{ApiError, ApiException},
    protocol::{PageQuery, PageResponse},
};
use tracing::debug;
use url::Url;

use crate::CollectionApi;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpCollectionApi<R> {
    http: Client,
    collection_url: Url,
    bearer_token: Option<String>,
    _record: PhantomData<fn() -> R>,
}

impl<R> HttpCollectionApi<R> {
    pub fn new(server_url: &str, collection: &str) -> Result<Self> {
        Self::with_timeout(server_url, collection, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(server_url: &str, collection: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            collection_url: collection_url(server_url, collection)?,
            bearer_token: None,
            _record: PhantomData,
        })
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn list_url(&self) -> Url {
        self.child_url("")
    }

    pub fn record_url(&self, id: &str) -> Url {
        self.child_url(id)
    }

    fn child_url(&self, segment: &str) -> Url {
        let mut url = self.collection_url.clone();
        // collection_url() only accepts http(s) bases, which always have path segments.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(segment);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn collection_url(server_url: &str, collection: &str) -> Result<Url> {
    let mut url = Url::parse(server_url.trim())
        .with_context(|| format!("invalid server url '{server_url}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!(
            "unsupported scheme '{}' in server url '{server_url}'",
            url.scheme()
        ));
    }

    let parts: Vec<&str> = collection
        .split('/')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        return Err(anyhow!("collection name must not be empty"));
    }

    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| anyhow!("server url '{server_url}' cannot be used as a base"))?
        .pop_if_empty()
        .extend(parts);
    Ok(url)
}

async fn error_for_status(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    match serde_json::from_str::<ApiError>(&body) {
        Ok(api_error) => Err(anyhow::Error::new(ApiException::from(api_error))
            .context(format!("server responded with {status}"))),
        Err(_) => Err(anyhow!("server responded with {status}")),
    }
}

#[async_trait]
impl<R> CollectionApi<R> for HttpCollectionApi<R>
where
    R: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, page: u32) -> Result<PageResponse<R>> {
        let url = self.list_url();
        debug!(%url, page, "fetching collection page");
        let res = self
            .authorize(self.http.get(url))
            .query(&PageQuery { page })
            .send()
            .await?;
        let body = error_for_status(res)
            .await?
            .json()
            .await
            .context("malformed collection page body")?;
        Ok(body)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let url = self.record_url(id);
        debug!(%url, "deleting collection record");
        let res = self.authorize(self.http.delete(url)).send().await?;
        error_for_status(res).await?;
        Ok(())
    }
}
