//! Endpoint descriptors
//!
//! An [`Endpoint`] identifies one paginated resource plus the query it is
//! requested with. An [`EndpointDescriptor`] maps an optional cursor to the
//! endpoint of that page; [`ListMode`] and [`PagedList`] are the built-in
//! descriptors for statuses lists.

use crate::pagination::Cursor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Query parameter carrying the cursor of the page to fetch
pub const CURSOR_PARAM: &str = "max_id";

/// Query parameter carrying the page size
pub const LIMIT_PARAM: &str = "limit";

/// A resource path plus ordered query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Path relative to the server's base URL
    pub path: String,
    /// Query parameters, in insertion order
    pub query: Vec<(String, String)>,
}

impl Endpoint {
    /// Create an endpoint without query parameters
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add the cursor parameter when a cursor is given
    #[must_use]
    pub fn cursor(self, cursor: Option<&Cursor>) -> Self {
        match cursor {
            Some(c) => self.query(CURSOR_PARAM, c.as_str()),
            None => self,
        }
    }

    /// Look up a query parameter
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}

/// Logical statuses list backed by a paginated endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListMode {
    /// Statuses the account bookmarked
    Bookmarks,
    /// Statuses the account favourited
    Favorites,
}

impl ListMode {
    /// Human-readable title
    pub fn title(&self) -> &'static str {
        match self {
            ListMode::Bookmarks => "Bookmarks",
            ListMode::Favorites => "Favorites",
        }
    }

    /// Resource path of this list
    pub fn path(&self) -> &'static str {
        match self {
            ListMode::Bookmarks => "/api/v1/bookmarks",
            ListMode::Favorites => "/api/v1/favourites",
        }
    }

    /// Endpoint for the page starting at `cursor` (first page when `None`)
    pub fn endpoint(&self, cursor: Option<&Cursor>) -> Endpoint {
        Endpoint::new(self.path()).cursor(cursor)
    }

    /// Endpoint with an explicit page size
    pub fn endpoint_with_limit(&self, cursor: Option<&Cursor>, limit: Option<u32>) -> Endpoint {
        let endpoint = self.endpoint(cursor);
        match limit {
            Some(limit) => endpoint.query(LIMIT_PARAM, limit.to_string()),
            None => endpoint,
        }
    }
}

/// Maps an optional cursor to the endpoint of the page it starts
pub trait EndpointDescriptor: Send + Sync {
    /// Endpoint for the page starting at `cursor` (first page when `None`)
    fn endpoint(&self, cursor: Option<&Cursor>) -> Endpoint;
}

impl EndpointDescriptor for ListMode {
    fn endpoint(&self, cursor: Option<&Cursor>) -> Endpoint {
        ListMode::endpoint(self, cursor)
    }
}

/// A list mode with a fixed page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagedList {
    pub mode: ListMode,
    pub limit: Option<u32>,
}

impl PagedList {
    /// Create a descriptor for `mode` with the server's default page size
    pub fn new(mode: ListMode) -> Self {
        Self { mode, limit: None }
    }

    /// Request `limit` items per page
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl EndpointDescriptor for PagedList {
    fn endpoint(&self, cursor: Option<&Cursor>) -> Endpoint {
        self.mode.endpoint_with_limit(cursor, self.limit)
    }
}

impl fmt::Display for ListMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
