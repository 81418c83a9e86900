//! Tests for the paged fetcher

use super::*;
use crate::controllers::ItemControllerRegistry;
use crate::endpoint::{Endpoint, ListMode};
use crate::error::{Error, Result};
use crate::pagination::{Cursor, Page};
use crate::source::PageSource;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// ============================================================================
// Test doubles
// ============================================================================

/// Replays scripted responses and records requested endpoints
#[derive(Default)]
struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Page<String>>>>,
    requests: Mutex<Vec<Endpoint>>,
}

impl ScriptedSource {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push_page(&self, items: &[&str], cursor: Option<&str>) {
        let items = items.iter().map(|s| (*s).to_string()).collect();
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(Page::new(items, cursor.map(Cursor::new))));
    }

    fn push_error(&self, error: Error) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    fn requests(&self) -> Vec<Endpoint> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource<String> for ScriptedSource {
    async fn get_page(&self, endpoint: &Endpoint) -> Result<Page<String>> {
        self.requests.lock().unwrap().push(endpoint.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other("no scripted response".to_string())))
    }
}

#[derive(Default)]
struct RecordingRegistry {
    updates: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl ItemControllerRegistry<String> for RecordingRegistry {
    async fn update_controllers(&self, items: &[String]) {
        self.updates.lock().unwrap().push(items.to_vec());
    }
}

#[derive(Default)]
struct RecordingVisibility {
    events: Mutex<Vec<String>>,
}

impl VisibilityObserver<String> for RecordingVisibility {
    fn item_appeared(&self, item: &String) {
        self.events.lock().unwrap().push(format!("+{item}"));
    }

    fn item_disappeared(&self, item: &String) {
        self.events.lock().unwrap().push(format!("-{item}"));
    }
}

fn transport_error() -> Error {
    Error::Timeout { timeout_ms: 30_000 }
}

fn fetcher(source: &Arc<ScriptedSource>) -> PagedFetcher<String, Arc<ScriptedSource>> {
    PagedFetcher::new(Arc::clone(source), ListMode::Bookmarks)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

// ============================================================================
// First page
// ============================================================================

#[test]
fn test_new_fetcher_starts_loading() {
    let source = ScriptedSource::new();
    let fetcher = fetcher(&source);

    assert!(matches!(fetcher.state(), FetchState::Loading));
    assert!(fetcher.items().is_empty());
    assert!(fetcher.cursor().is_none());
}

#[tokio::test]
async fn test_first_page_then_next_page_scenario() {
    let source = ScriptedSource::new();
    source.push_page(&["A", "B"], Some("c1"));
    source.push_page(&["C"], None);
    let mut fetcher = fetcher(&source);

    fetcher.load_first_page(false).await;
    let state = fetcher.state();
    assert_eq!(state.items(), strings(&["A", "B"]).as_slice());
    assert_eq!(state.next_page(), Some(NextPageState::HasNextPage));
    assert!(state.has_more());

    assert!(fetcher.load_next_page().await);
    let state = fetcher.state();
    assert_eq!(state.items(), strings(&["A", "B", "C"]).as_slice());
    assert_eq!(state.next_page(), Some(NextPageState::None));

    // Cursor exhausted: no request, state unchanged
    assert!(!fetcher.load_next_page().await);
    assert_eq!(fetcher.items(), strings(&["A", "B", "C"]));
    assert_eq!(fetcher.state().next_page(), Some(NextPageState::None));
    assert_eq!(source.requests().len(), 2);
}

#[tokio::test]
async fn test_first_page_requests_without_cursor() {
    let source = ScriptedSource::new();
    source.push_page(&["A"], Some("c1"));
    source.push_page(&["B"], None);
    let mut fetcher = fetcher(&source);

    fetcher.load_first_page(false).await;
    fetcher.load_next_page().await;

    let requests = source.requests();
    assert_eq!(requests[0], ListMode::Bookmarks.endpoint(None));
    assert_eq!(requests[1].query_value("max_id"), Some("c1"));
}

#[tokio::test]
async fn test_first_page_replaces_previous_items() {
    let source = ScriptedSource::new();
    source.push_page(&["A", "B"], Some("c1"));
    source.push_page(&["X"], None);
    let mut fetcher = fetcher(&source);

    fetcher.load_first_page(false).await;
    fetcher.load_first_page(true).await;

    assert_eq!(fetcher.items(), strings(&["X"]));
    assert!(fetcher.cursor().is_none());
    assert!(!fetcher.state().has_more());
}

#[tokio::test]
async fn test_first_page_discards_prior_cursor() {
    let source = ScriptedSource::new();
    source.push_page(&["A"], Some("c1"));
    source.push_page(&["B"], Some("c2"));
    source.push_page(&["C"], None);
    let mut fetcher = fetcher(&source);

    fetcher.load_first_page(false).await;
    fetcher.load_first_page(true).await;
    assert_eq!(fetcher.cursor(), Some(&Cursor::new("c2")));

    fetcher.load_next_page().await;
    assert_eq!(source.requests()[2].query_value("max_id"), Some("c2"));
    assert_eq!(fetcher.items(), strings(&["B", "C"]));
}

#[tokio::test]
async fn test_first_page_failure_surfaces_error() {
    let source = ScriptedSource::new();
    source.push_error(transport_error());
    let mut fetcher = fetcher(&source);

    fetcher.load_first_page(false).await;

    let state = fetcher.state();
    assert!(matches!(
        state.error().map(|e| e.as_ref()),
        Some(Error::Timeout { .. })
    ));
    assert!(state.items().is_empty());
    assert!(!state.is_loading());
}

#[tokio::test]
async fn test_first_page_failure_hides_prior_items_and_cursor() {
    let source = ScriptedSource::new();
    source.push_page(&["A", "B"], Some("c1"));
    source.push_error(transport_error());
    let mut fetcher = fetcher(&source);

    fetcher.load_first_page(false).await;
    fetcher.load_first_page(true).await;

    assert!(fetcher.state().error().is_some());
    assert!(fetcher.items().is_empty());
    assert!(fetcher.cursor().is_none());

    // Stale cursor is gone, so nothing is requested
    assert!(!fetcher.load_next_page().await);
    assert_eq!(source.requests().len(), 2);
}

// ============================================================================
// Next page
// ============================================================================

#[test]
fn test_next_page_without_cursor_is_noop() {
    let source = ScriptedSource::new();
    let mut fetcher = fetcher(&source);

    assert!(!tokio_test::block_on(fetcher.load_next_page()));
    assert!(matches!(fetcher.state(), FetchState::Loading));
    assert!(source.requests().is_empty());
}

#[tokio::test]
async fn test_next_page_does_not_deduplicate() {
    let source = ScriptedSource::new();
    source.push_page(&["A", "B"], Some("c1"));
    source.push_page(&["B", "C"], None);
    let mut fetcher = fetcher(&source);

    fetcher.load_first_page(false).await;
    fetcher.load_next_page().await;

    assert_eq!(fetcher.items(), strings(&["A", "B", "B", "C"]));
}

#[tokio::test]
async fn test_next_page_failure_keeps_list() {
    let source = ScriptedSource::new();
    source.push_page(&["A", "B"], Some("c1"));
    source.push_error(Error::http_status(502, "bad gateway"));
    let mut fetcher = fetcher(&source);

    fetcher.load_first_page(false).await;
    let before = fetcher.state();

    assert!(fetcher.load_next_page().await);
    let after = fetcher.state();

    assert_eq!(after.items(), before.items());
    assert_eq!(after.next_page(), before.next_page());
    assert_eq!(fetcher.cursor(), Some(&Cursor::new("c1")));
    assert!(after.error().is_none());
    assert!(matches!(
        after.transient_error().map(|e| e.as_ref()),
        Some(Error::HttpStatus { status: 502, .. })
    ));
}

#[tokio::test]
async fn test_next_page_retry_after_failure_clears_transient_error() {
    let source = ScriptedSource::new();
    source.push_page(&["A"], Some("c1"));
    source.push_error(transport_error());
    source.push_page(&["B"], None);
    let mut fetcher = fetcher(&source);

    fetcher.load_first_page(false).await;
    fetcher.load_next_page().await;
    fetcher.load_next_page().await;

    let state = fetcher.state();
    assert_eq!(state.items(), strings(&["A", "B"]).as_slice());
    assert!(state.transient_error().is_none());
    let requests = source.requests();
    assert_eq!(requests[1], requests[2]);
}

// ============================================================================
// Observation
// ============================================================================

#[tokio::test]
async fn test_subscribers_see_transitions() {
    let source = ScriptedSource::new();
    source.push_page(&["A"], Some("c1"));
    let mut fetcher = fetcher(&source);
    let mut rx = fetcher.subscribe();

    fetcher.load_first_page(false).await;
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_loaded());
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test]
async fn test_next_page_publishes_loading_state_first() {
    struct PeekingSource {
        rx: Mutex<Option<tokio::sync::watch::Receiver<FetchState<String>>>>,
        seen: Mutex<Option<NextPageState>>,
    }

    #[async_trait]
    impl PageSource<String> for PeekingSource {
        async fn get_page(&self, endpoint: &Endpoint) -> Result<Page<String>> {
            if endpoint.query_value("max_id").is_some() {
                let state = self.rx.lock().unwrap().as_ref().unwrap().borrow().clone();
                *self.seen.lock().unwrap() = state.next_page();
                assert!(state.is_loading());
                return Ok(Page::last(vec!["B".to_string()]));
            }
            Ok(Page::new(vec!["A".to_string()], Some(Cursor::new("c1"))))
        }
    }

    let source = Arc::new(PeekingSource {
        rx: Mutex::new(None),
        seen: Mutex::new(None),
    });
    let mut fetcher = PagedFetcher::new(Arc::clone(&source), ListMode::Favorites);
    *source.rx.lock().unwrap() = Some(fetcher.subscribe());

    fetcher.load_first_page(false).await;
    fetcher.load_next_page().await;

    assert_eq!(
        *source.seen.lock().unwrap(),
        Some(NextPageState::LoadingNextPage)
    );
    assert_eq!(fetcher.items(), strings(&["A", "B"]));
}

#[tokio::test]
async fn test_registry_sees_full_list_after_each_success() {
    let source = ScriptedSource::new();
    source.push_page(&["A", "B"], Some("c1"));
    source.push_error(transport_error());
    source.push_page(&["C"], None);
    let registry = Arc::new(RecordingRegistry::default());
    let mut fetcher = fetcher(&source).with_registry(registry.clone());

    fetcher.load_first_page(false).await;
    fetcher.load_next_page().await;
    fetcher.load_next_page().await;

    let updates = registry.updates.lock().unwrap().clone();
    assert_eq!(
        updates,
        vec![strings(&["A", "B"]), strings(&["A", "B", "C"])]
    );
}

#[tokio::test]
async fn test_registry_not_notified_on_first_page_failure() {
    let source = ScriptedSource::new();
    source.push_error(transport_error());
    let registry = Arc::new(RecordingRegistry::default());
    let mut fetcher = fetcher(&source).with_registry(registry.clone());

    fetcher.load_first_page(false).await;

    assert!(registry.updates.lock().unwrap().is_empty());
}

#[test]
fn test_visibility_hooks_forward_to_observer() {
    let source = ScriptedSource::new();
    let observer = Arc::new(RecordingVisibility::default());
    let fetcher = fetcher(&source).with_visibility_observer(observer.clone());

    fetcher.item_appeared(&"A".to_string());
    fetcher.item_disappeared(&"A".to_string());

    assert_eq!(*observer.events.lock().unwrap(), strings(&["+A", "-A"]));
}

#[test]
fn test_visibility_hooks_default_to_noop() {
    let source = ScriptedSource::new();
    let fetcher = fetcher(&source);

    fetcher.item_appeared(&"A".to_string());
    fetcher.item_disappeared(&"A".to_string());
    assert!(matches!(fetcher.state(), FetchState::Loading));
}

// ============================================================================
// FetchState helpers
// ============================================================================

#[test]
fn test_fetch_state_helpers() {
    let loading: FetchState<u8> = FetchState::Loading;
    assert!(loading.is_loading());
    assert!(loading.next_page().is_none());

    let loaded = FetchState::Loaded {
        items: vec![1u8, 2],
        next_page: NextPageState::LoadingNextPage,
        transient_error: None,
    };
    assert!(loaded.is_loading());
    assert!(!loaded.has_more());
    assert_eq!(loaded.items(), &[1, 2]);

    let failed: FetchState<u8> = FetchState::Error(Arc::new(transport_error()));
    assert!(!failed.is_loaded());
    assert!(failed.error().is_some());
    assert!(failed.transient_error().is_none());

    assert_eq!(NextPageState::from_has_more(true), NextPageState::HasNextPage);
    assert_eq!(NextPageState::from_has_more(false), NextPageState::None);
}
