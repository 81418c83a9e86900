//! Page sources
//!
//! A [`PageSource`] fetches one [`Page`] for an [`Endpoint`]. The fetcher
//! only talks to this trait, so it can be driven by the HTTP client or by
//! an in-memory source in tests.

use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::http::HttpClient;
use crate::pagination::Page;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Fetches pages of `T` from a paginated endpoint
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    /// Fetch the page identified by `endpoint`
    async fn get_page(&self, endpoint: &Endpoint) -> Result<Page<T>>;
}

#[async_trait]
impl<T> PageSource<T> for HttpClient
where
    T: DeserializeOwned + Send + 'static,
{
    async fn get_page(&self, endpoint: &Endpoint) -> Result<Page<T>> {
        let (items, link) = self.get_with_link::<T>(endpoint).await?;
        let next_cursor = link.and_then(|l| l.next_cursor());
        Ok(Page::new(items, next_cursor))
    }
}

#[async_trait]
impl<T, S> PageSource<T> for Arc<S>
where
    S: PageSource<T> + ?Sized,
    T: 'static,
{
    async fn get_page(&self, endpoint: &Endpoint) -> Result<Page<T>> {
        (**self).get_page(endpoint).await
    }
}
