use std::{num::NonZeroU32, sync::Arc};

use shared::domain::CollectionRecord;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    error::CollectionError,
    types::{CollectionEvent, PageState, DEFAULT_PAGE_SIZE},
    CollectionApi,
};

/// Keeps one page of a remote collection, its pagination metadata and local
/// deletions coherent.
///
/// The state lock is never held across a collaborator call: every mutation is
/// applied in one step after the request resolves. Overlapping loads are
/// tagged with a sequence number when issued, and a response older than the
/// last applied one is dropped, so the most recently issued load wins.
pub struct PagedCollectionController<R: CollectionRecord> {
    api: Arc<dyn CollectionApi<R>>,
    inner: Mutex<ControllerState<R>>,
    events: broadcast::Sender<CollectionEvent>,
}

struct ControllerState<R> {
    page: PageState,
    records: Vec<R>,
    issued_loads: u64,
    applied_load: u64,
    disposed: bool,
}

impl<R: CollectionRecord> PagedCollectionController<R> {
    pub fn new(api: Arc<dyn CollectionApi<R>>) -> Arc<Self> {
        Self::with_page_size(api, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(api: Arc<dyn CollectionApi<R>>, page_size: NonZeroU32) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            api,
            inner: Mutex::new(ControllerState {
                page: PageState::new(page_size),
                records: Vec::new(),
                issued_loads: 0,
                applied_load: 0,
                disposed: false,
            }),
            events,
        })
    }

    pub async fn load(&self, page: u32) {
        let _ = self.try_load(page).await;
    }

    pub async fn try_load(&self, page: u32) -> Result<(), CollectionError> {
        if page == 0 {
            return Err(self.report(CollectionError::InvalidPage { page }));
        }

        let sequence = {
            let mut guard = self.inner.lock().await;
            if guard.disposed {
                debug!(page, "skipping load on disposed collection controller");
                return Ok(());
            }
            guard.issued_loads += 1;
            guard.issued_loads
        };

        let response = match self.api.fetch_page(page).await {
            Ok(response) => response,
            Err(source) => return Err(self.report(CollectionError::FetchFailed { page, source })),
        };

        let (records, total_count) = {
            let mut guard = self.inner.lock().await;
            if guard.disposed {
                debug!(page, "dropping page response for disposed collection controller");
                return Ok(());
            }
            if sequence < guard.applied_load {
                debug!(
                    page,
                    sequence,
                    applied = guard.applied_load,
                    "dropping out-of-order page response"
                );
                let _ = self
                    .events
                    .send(CollectionEvent::StaleResponseDiscarded { page });
                return Ok(());
            }
            guard.applied_load = sequence;
            guard.records = response.result;
            guard.page.total_count = response.count;
            guard.page.current_page = page;
            (guard.records.len(), guard.page.total_count)
        };

        info!(page, records, total_count, "collection page loaded");
        let _ = self.events.send(CollectionEvent::PageLoaded {
            page,
            records,
            total_count,
        });
        Ok(())
    }

    /// The total count is left as is until the next load.
    pub async fn remove(&self, id: &str) {
        let _ = self.try_remove(id).await;
    }

    pub async fn try_remove(&self, id: &str) -> Result<(), CollectionError> {
        if self.inner.lock().await.disposed {
            debug!(id, "skipping delete on disposed collection controller");
            return Ok(());
        }

        if let Err(source) = self.api.delete(id).await {
            return Err(self.report(CollectionError::DeleteFailed {
                id: id.to_string(),
                source,
            }));
        }

        let removed = {
            let mut guard = self.inner.lock().await;
            if guard.disposed {
                debug!(id, "dropping delete result for disposed collection controller");
                return Ok(());
            }
            let before = guard.records.len();
            guard.records.retain(|record| record.record_id() != id);
            before - guard.records.len()
        };

        if removed == 0 {
            debug!(id, "deleted record was not on the displayed page");
        } else {
            info!(id, "record removed");
        }
        let _ = self.events.send(CollectionEvent::RecordRemoved { id: id.to_string() });
        Ok(())
    }

    pub async fn go_to_page(&self, page: u32) {
        let _ = self.try_go_to_page(page).await;
    }

    pub async fn try_go_to_page(&self, page: u32) -> Result<(), CollectionError> {
        if page == 0 {
            return Err(self.report(CollectionError::InvalidPage { page }));
        }
        {
            let mut guard = self.inner.lock().await;
            if !guard.disposed {
                guard.page.current_page = page;
            }
        }
        self.try_load(page).await
    }

    /// In-flight requests still complete but no longer touch the state.
    pub async fn dispose(&self) {
        let mut guard = self.inner.lock().await;
        if !guard.disposed {
            guard.disposed = true;
            debug!("collection controller disposed");
        }
    }

    pub async fn is_disposed(&self) -> bool {
        self.inner.lock().await.disposed
    }

    pub async fn page_state(&self) -> PageState {
        self.inner.lock().await.page
    }

    pub async fn records(&self) -> Vec<R> {
        self.inner.lock().await.records.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CollectionEvent> {
        self.events.subscribe()
    }

    fn report(&self, err: CollectionError) -> CollectionError {
        warn!(error = %err, "collection operation failed");
        let _ = self.events.send(CollectionEvent::Error(err.to_string()));
        err
    }
}
