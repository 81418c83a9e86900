//! Paged fetcher implementation

use super::state::{FetchState, NextPageState};
use crate::controllers::{ItemControllerRegistry, NoopRegistry};
use crate::endpoint::EndpointDescriptor;
use crate::pagination::Cursor;
use crate::source::PageSource;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Visibility hooks for items shown by a consumer
///
/// Both methods default to doing nothing.
pub trait VisibilityObserver<T>: Send + Sync {
    /// `item` scrolled into view
    fn item_appeared(&self, _item: &T) {}

    /// `item` scrolled out of view
    fn item_disappeared(&self, _item: &T) {}
}

/// Accumulates pages of items for one logical list
///
/// Both load operations take `&mut self`, so at most one request is in
/// flight per fetcher. Every state change is published to subscribers.
pub struct PagedFetcher<T, S> {
    source: S,
    descriptor: Box<dyn EndpointDescriptor>,
    registry: Arc<dyn ItemControllerRegistry<T>>,
    visibility: Option<Arc<dyn VisibilityObserver<T>>>,
    items: Vec<T>,
    cursor: Option<Cursor>,
    state: watch::Sender<FetchState<T>>,
}

impl<T, S> PagedFetcher<T, S>
where
    T: Clone + Send + Sync + 'static,
    S: PageSource<T>,
{
    /// Create a fetcher over `source` for the list described by `descriptor`
    pub fn new(source: S, descriptor: impl EndpointDescriptor + 'static) -> Self {
        let (state, _) = watch::channel(FetchState::Loading);
        Self {
            source,
            descriptor: Box::new(descriptor),
            registry: Arc::new(NoopRegistry),
            visibility: None,
            items: Vec::new(),
            cursor: None,
            state,
        }
    }

    /// Notify `registry` with the full item list after every successful load
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<dyn ItemControllerRegistry<T>>) -> Self {
        self.registry = registry;
        self
    }

    /// Forward visibility hooks to `observer`
    #[must_use]
    pub fn with_visibility_observer(mut self, observer: Arc<dyn VisibilityObserver<T>>) -> Self {
        self.visibility = Some(observer);
        self
    }

    /// Current state
    pub fn state(&self) -> FetchState<T> {
        self.state.borrow().clone()
    }

    /// Receiver that observes every published state
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.state.subscribe()
    }

    /// Items currently visible to consumers
    pub fn items(&self) -> Vec<T> {
        self.state.borrow().items().to_vec()
    }

    /// Cursor of the next page, if any
    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// Load the first page, replacing everything loaded so far
    ///
    /// On failure the state becomes [`FetchState::Error`] and the stored
    /// cursor is discarded.
    pub async fn load_first_page(&mut self, pull_to_refresh: bool) {
        debug!(pull_to_refresh, "Loading first page");
        self.publish(FetchState::Loading);

        let endpoint = self.descriptor.endpoint(None);
        match self.source.get_page(&endpoint).await {
            Ok(page) => {
                debug!(
                    "Loaded {} items from {} (more: {})",
                    page.len(),
                    endpoint,
                    page.has_more()
                );
                self.items = page.items;
                self.cursor = page.next_cursor;
                self.registry.update_controllers(&self.items).await;
                self.publish(self.loaded(None));
            }
            Err(e) => {
                warn!("Failed to load {}: {}", endpoint, e);
                self.cursor = None;
                self.publish(FetchState::Error(Arc::new(e)));
            }
        }
    }

    /// Load the page after the stored cursor and append it
    ///
    /// Returns `false` without issuing a request when no cursor is stored.
    /// A failed request keeps the list and its next-page flag, attaching
    /// the error as the loaded state's `transient_error`.
    pub async fn load_next_page(&mut self) -> bool {
        let Some(cursor) = self.cursor.clone() else {
            return false;
        };

        self.publish(FetchState::Loaded {
            items: self.items.clone(),
            next_page: NextPageState::LoadingNextPage,
            transient_error: None,
        });

        let endpoint = self.descriptor.endpoint(Some(&cursor));
        match self.source.get_page(&endpoint).await {
            Ok(page) => {
                debug!(
                    "Appending {} items from {} (more: {})",
                    page.len(),
                    endpoint,
                    page.has_more()
                );
                self.items.extend(page.items);
                self.cursor = page.next_cursor;
                self.registry.update_controllers(&self.items).await;
                self.publish(self.loaded(None));
            }
            Err(e) => {
                warn!("Failed to load next page {}: {}", endpoint, e);
                self.publish(self.loaded(Some(Arc::new(e))));
            }
        }
        true
    }

    /// Visibility hook: `item` appeared on screen
    pub fn item_appeared(&self, item: &T) {
        if let Some(observer) = &self.visibility {
            observer.item_appeared(item);
        }
    }

    /// Visibility hook: `item` left the screen
    pub fn item_disappeared(&self, item: &T) {
        if let Some(observer) = &self.visibility {
            observer.item_disappeared(item);
        }
    }

    fn loaded(&self, transient_error: Option<Arc<crate::Error>>) -> FetchState<T> {
        FetchState::Loaded {
            items: self.items.clone(),
            next_page: NextPageState::from_has_more(self.cursor.is_some()),
            transient_error,
        }
    }

    fn publish(&self, state: FetchState<T>) {
        self.state.send_replace(state);
    }
}

impl<T, S: std::fmt::Debug> std::fmt::Debug for PagedFetcher<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedFetcher")
            .field("source", &self.source)
            .field("items", &self.items.len())
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}
