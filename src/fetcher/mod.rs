//! Paged fetcher
//!
//! [`PagedFetcher`] owns the accumulated items, the cursor and the
//! observable [`FetchState`] of one logical list.
//!
//! ```text
//! Loading ──ok──▶ Loaded(HasNextPage | None)
//!    │                 │ load_next_page
//!    └─err─▶ Error     ▼
//!              Loaded(LoadingNextPage) ──ok──▶ Loaded(items ++ page)
//!                                      └─err─▶ Loaded(items, transient_error)
//! ```

mod paged;
mod state;

pub use paged::{PagedFetcher, VisibilityObserver};
pub use state::{FetchState, NextPageState};

#[cfg(test)]
mod tests;
