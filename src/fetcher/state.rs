//! Observable fetch state

use crate::error::Error;
use std::sync::Arc;

/// Whether another page can be requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPageState {
    /// A cursor is stored; `load_next_page` will issue a request
    HasNextPage,
    /// A next-page request is in flight
    LoadingNextPage,
    /// The list is exhausted
    None,
}

impl NextPageState {
    /// Derive the settled state from the presence of a cursor
    pub fn from_has_more(has_more: bool) -> Self {
        if has_more {
            Self::HasNextPage
        } else {
            Self::None
        }
    }
}

/// What a consumer of a fetcher sees
#[derive(Debug, Clone)]
pub enum FetchState<T> {
    /// First page requested, nothing to show yet
    Loading,

    /// Items available
    Loaded {
        /// Accumulated items in server order
        items: Vec<T>,
        /// Next page availability
        next_page: NextPageState,
        /// Failure of the most recent next-page request; the list is kept
        transient_error: Option<Arc<Error>>,
    },

    /// First page failed
    Error(Arc<Error>),
}

impl<T> FetchState<T> {
    /// Items visible in this state (empty unless loaded)
    pub fn items(&self) -> &[T] {
        match self {
            FetchState::Loaded { items, .. } => items,
            FetchState::Loading | FetchState::Error(_) => &[],
        }
    }

    /// Next page availability, if loaded
    pub fn next_page(&self) -> Option<NextPageState> {
        match self {
            FetchState::Loaded { next_page, .. } => Some(*next_page),
            _ => None,
        }
    }

    /// Check if more pages can be requested
    pub fn has_more(&self) -> bool {
        self.next_page() == Some(NextPageState::HasNextPage)
    }

    /// Check if any request is in flight
    pub fn is_loading(&self) -> bool {
        match self {
            FetchState::Loading => true,
            FetchState::Loaded { next_page, .. } => *next_page == NextPageState::LoadingNextPage,
            FetchState::Error(_) => false,
        }
    }

    /// Check if items are available
    pub fn is_loaded(&self) -> bool {
        matches!(self, FetchState::Loaded { .. })
    }

    /// First-page failure, if any
    pub fn error(&self) -> Option<&Arc<Error>> {
        match self {
            FetchState::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Next-page failure attached to a loaded list, if any
    pub fn transient_error(&self) -> Option<&Arc<Error>> {
        match self {
            FetchState::Loaded {
                transient_error, ..
            } => transient_error.as_ref(),
            _ => None,
        }
    }
}
