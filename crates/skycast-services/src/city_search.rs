//! Paginated city search driven by query, sort and filter changes.
//!
//! Every parameter change issues exactly one fetch tagged with a new
//! generation number. A response is applied only if no fetch was issued
//! after it, so results follow request order rather than arrival order.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use skycast_cities::{CitySource, SearchParams, SortDirection, SortSpec};
use skycast_core::{AppError, Config};
use tokio::sync::watch;

use crate::debounce::Debouncer;
use crate::search_state::SearchPageState;

/// Parameters of the latest issued fetch
struct Cursor {
    params: SearchParams,
    generation: u64,
    /// Parameters of the last fetch that failed, for `retry`
    failed: Option<SearchParams>,
    /// The first page for `params` has been applied to the state
    first_page_loaded: bool,
}

struct Inner {
    source: Arc<dyn CitySource>,
    cursor: Mutex<Cursor>,
    state: watch::Sender<SearchPageState>,
}

pub struct CitySearchController {
    inner: Arc<Inner>,
    debouncer: Debouncer,
}

impl CitySearchController {
    pub fn new(source: Arc<dyn CitySource>, page_size: u32, debounce: Duration) -> Self {
        let (state, _) = watch::channel(SearchPageState::default());
        Self {
            inner: Arc::new(Inner {
                source,
                cursor: Mutex::new(Cursor {
                    params: SearchParams::new(page_size),
                    generation: 0,
                    failed: None,
                    first_page_loaded: false,
                }),
                state,
            }),
            debouncer: Debouncer::new(debounce),
        }
    }

    pub fn from_config(source: Arc<dyn CitySource>, config: &Config) -> Self {
        Self::new(source, config.cities.page_size, config.search.debounce())
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SearchPageState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SearchPageState> {
        self.inner.state.subscribe()
    }

    /// Parameters of the latest issued fetch
    pub fn params(&self) -> SearchParams {
        self.inner.cursor.lock().params.clone()
    }

    /// Update the free-text query after the debounce quiet period.
    ///
    /// Calls within the quiet period collapse into one fetch for the last
    /// text. An empty text clears the query.
    pub fn set_query(&self, text: impl Into<String>) {
        let text = text.into();
        let inner = self.inner.clone();
        self.debouncer.call(async move {
            let query = Some(text).filter(|t| !t.is_empty());
            tracing::debug!("Search query settled: {:?}", query);
            inner
                .reset_with(|params| params.query = query)
                .await;
        });
    }

    pub async fn set_sort(&self, field: impl Into<String>, direction: SortDirection) {
        let sort = SortSpec::new(field, direction);
        self.inner
            .reset_with(|params| params.sort = Some(sort))
            .await;
    }

    pub async fn set_filter(&self, field: impl Into<String>, value: impl Into<String>) {
        let (field, value) = (field.into(), value.into());
        self.inner
            .reset_with(|params| {
                params.filters.insert(field, value);
            })
            .await;
    }

    pub async fn clear_filter(&self, field: &str) {
        self.inner
            .reset_with(|params| {
                params.filters.remove(field);
            })
            .await;
    }

    /// Drop all filters along with the query and sort. Page size is kept and
    /// a query still waiting out its debounce is discarded.
    pub async fn clear_all_filters(&self) {
        self.debouncer.cancel();
        self.inner
            .reset_with(|params| *params = SearchParams::new(params.page_size))
            .await;
    }

    /// Fetch the next page. Does nothing while a fetch is in flight, before
    /// the first page of the current parameters has arrived, or once every
    /// result has been loaded.
    pub async fn load_more(&self) {
        let issued = {
            let mut cursor = self.inner.cursor.lock();
            let blocked = {
                let state = self.inner.state.borrow();
                state.loading || state.exhausted
            };
            if blocked || !cursor.first_page_loaded {
                tracing::trace!("load_more ignored");
                None
            } else {
                cursor.params.page_offset += cursor.params.page_size;
                Some(self.inner.issue(&mut cursor))
            }
        };

        if let Some((params, generation)) = issued {
            self.inner.fetch(params, generation).await;
        }
    }

    /// Pagination sentinel visibility changed.
    pub async fn on_viewport_signal(&self, visible: bool) {
        if visible {
            self.load_more().await;
        }
    }

    /// Reload the first page for the current parameters. Also used for the
    /// initial load.
    pub async fn refresh(&self) {
        self.inner
            .reset_with(|params| params.page_offset = 0)
            .await;
    }

    /// Re-issue the last failed fetch as it was. Does nothing if the last
    /// fetch succeeded.
    pub async fn retry(&self) {
        let issued = {
            let mut cursor = self.inner.cursor.lock();
            match cursor.failed.take() {
                Some(params) => {
                    cursor.params = params;
                    Some(self.inner.issue(&mut cursor))
                }
                None => None,
            }
        };

        if let Some((params, generation)) = issued {
            tracing::info!("Retrying city search at offset {}", params.page_offset);
            self.inner.fetch(params, generation).await;
        }
    }
}

impl Inner {
    /// Apply `mutate`, rewind to the first page and fetch it.
    async fn reset_with(&self, mutate: impl FnOnce(&mut SearchParams)) {
        let (params, generation) = {
            let mut cursor = self.cursor.lock();
            mutate(&mut cursor.params);
            cursor.params.page_offset = 0;
            self.issue(&mut cursor)
        };
        self.fetch(params, generation).await;
    }

    /// Start a fetch for the cursor's parameters. Caller holds the cursor lock.
    fn issue(&self, cursor: &mut Cursor) -> (SearchParams, u64) {
        cursor.generation += 1;
        cursor.failed = None;
        if cursor.params.is_reset() {
            cursor.first_page_loaded = false;
        }
        self.state.send_modify(SearchPageState::begin);
        (cursor.params.clone(), cursor.generation)
    }

    async fn fetch(&self, params: SearchParams, generation: u64) {
        let result = self.source.search(&params).await;

        let mut cursor = self.cursor.lock();
        if cursor.generation != generation {
            tracing::debug!(
                "Discarding stale search response (generation {}, current {})",
                generation,
                cursor.generation
            );
            return;
        }

        match result {
            Ok(page) => {
                tracing::debug!(
                    "Search page at offset {}: {} of {} records",
                    params.page_offset,
                    page.cities.len(),
                    page.total
                );
                let reset = params.is_reset();
                if reset {
                    cursor.first_page_loaded = true;
                }
                self.state.send_modify(|state| state.apply(page, reset));
            }
            Err(e) => {
                tracing::warn!("City search failed: {}", e);
                let message = AppError::from(e).user_message();
                if !params.is_reset() {
                    // Let load_more request the same page again
                    cursor.params.page_offset = cursor
                        .params
                        .page_offset
                        .saturating_sub(cursor.params.page_size);
                }
                cursor.failed = Some(params);
                self.state.send_modify(|state| state.fail(message));
            }
        }
    }
}
