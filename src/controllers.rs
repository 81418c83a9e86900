//! Per-item controller registries
//!
//! After every successful load the fetcher hands its full item list to an
//! injected [`ItemControllerRegistry`], which builds or refreshes derived
//! display state for each item.

use crate::model::{Identified, Status};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Receives the full item list after each successful load
#[async_trait]
pub trait ItemControllerRegistry<T>: Send + Sync {
    /// Create or refresh controllers for `items`
    async fn update_controllers(&self, items: &[T]);
}

/// Derived interaction state for one status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusDataController {
    pub favourites_count: u64,
    pub reblogs_count: u64,
    pub replies_count: u64,
    pub is_favourited: bool,
    pub is_reblogged: bool,
    pub is_bookmarked: bool,
}

impl StatusDataController {
    /// Build the controller for a status, following reblogs
    pub fn from_status(status: &Status) -> Self {
        let shown = status.displayed();
        Self {
            favourites_count: shown.favourites_count,
            reblogs_count: shown.reblogs_count,
            replies_count: shown.replies_count,
            is_favourited: shown.favourited.unwrap_or(false),
            is_reblogged: shown.reblogged.unwrap_or(false),
            is_bookmarked: shown.bookmarked.unwrap_or(false),
        }
    }
}

/// Registry of [`StatusDataController`]s keyed by status id
#[derive(Debug, Clone, Default)]
pub struct StatusDataControllers {
    controllers: Arc<RwLock<HashMap<String, StatusDataController>>>,
}

impl StatusDataControllers {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the controller for a status id
    pub async fn get(&self, id: &str) -> Option<StatusDataController> {
        self.controllers.read().await.get(id).cloned()
    }

    /// Number of tracked statuses
    pub async fn len(&self) -> usize {
        self.controllers.read().await.len()
    }

    /// Check if no status is tracked
    pub async fn is_empty(&self) -> bool {
        self.controllers.read().await.is_empty()
    }
}

#[async_trait]
impl ItemControllerRegistry<Status> for StatusDataControllers {
    async fn update_controllers(&self, items: &[Status]) {
        let mut controllers = self.controllers.write().await;
        for status in items {
            controllers.insert(
                status.id().to_string(),
                StatusDataController::from_status(status),
            );
        }
        debug!(
            "Refreshed {} status controllers ({} tracked)",
            items.len(),
            controllers.len()
        );
    }
}

/// Registry that ignores every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRegistry;

#[async_trait]
impl<T: Sync + 'static> ItemControllerRegistry<T> for NoopRegistry {
    async fn update_controllers(&self, _items: &[T]) {}
}
