//! Pagination module
//!
//! Cursors, pages, and `Link` header parsing.
//!
//! # Overview
//!
//! A page source returns a [`Page`] of items plus an optional [`Cursor`].
//! For HTTP sources the cursor is the `max_id` of the `next` relation in
//! the response's `Link` header, extracted by [`LinkHandler`].

mod link;
mod types;

pub use link::LinkHandler;
pub use types::{Cursor, Page};
