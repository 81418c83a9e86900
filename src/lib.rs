//! # feedpager
//!
//! Cursor-paginated statuses lists (bookmarks, favourites) for
//! Mastodon-compatible servers.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use feedpager::{HttpClient, HttpClientConfig, ListMode, PagedFetcher, Status};
//!
//! #[tokio::main]
//! async fn main() -> feedpager::Result<()> {
//!     let config = HttpClientConfig::builder()
//!         .base_url("https://example.social")
//!         .bearer_token("...")
//!         .build();
//!     let client = HttpClient::with_config(config)?;
//!
//!     let mut fetcher = PagedFetcher::<Status, _>::new(client, ListMode::Bookmarks);
//!     fetcher.load_first_page(false).await;
//!     while fetcher.load_next_page().await {}
//!
//!     println!("{} bookmarks", fetcher.items().len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                    PagedFetcher                      │
//! │  load_first_page()  load_next_page()  subscribe()    │
//! └───────┬──────────────────┬───────────────────┬───────┘
//!         │                  │                   │
//!  ┌──────┴──────┐   ┌───────┴───────┐   ┌───────┴────────┐
//!  │ PageSource  │   │  Endpoint     │   │ Controller     │
//!  │ HttpClient  │   │  ListMode     │   │ Registry       │
//!  │ Link header │   │  max_id       │   │ per-status     │
//!  └─────────────┘   └───────────────┘   └────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Common types and type aliases
pub mod types;

/// Request authentication
pub mod auth;

/// HTTP client with rate limiting
pub mod http;

/// Cursors, pages and Link header parsing
pub mod pagination;

/// Endpoint descriptors
pub mod endpoint;

/// Page sources
pub mod source;

/// Domain records
pub mod model;

/// Per-item controller registries
pub mod controllers;

/// Paged fetcher
pub mod fetcher;

/// Configuration file
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use controllers::{ItemControllerRegistry, StatusDataControllers};
pub use endpoint::{Endpoint, EndpointDescriptor, ListMode, PagedList};
pub use error::{Error, Result};
pub use fetcher::{FetchState, NextPageState, PagedFetcher, VisibilityObserver};
pub use http::{HttpClient, HttpClientConfig};
pub use model::{Account, Status};
pub use pagination::{Cursor, LinkHandler, Page};
pub use source::PageSource;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
