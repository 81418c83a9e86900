//! Pagination types
//!
//! Defines the cursor and page abstractions shared by page sources and
//! the fetcher.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque continuation token returned by a paginated endpoint.
///
/// Only valid immediately after the fetch that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Create a cursor from a raw token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the raw token
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the cursor, returning the raw token
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Cursor {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Cursor {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// One bounded response from a paginated endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items in server response order
    pub items: Vec<T>,
    /// Cursor for the following page, if any
    pub next_cursor: Option<Cursor>,
}

impl<T> Page<T> {
    /// Create a page
    pub fn new(items: Vec<T>, next_cursor: Option<Cursor>) -> Self {
        Self { items, next_cursor }
    }

    /// Create the final page of a list
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }

    /// Check if more pages follow this one
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Number of items on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the page carries no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
