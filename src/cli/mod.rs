//! CLI module
//!
//! Command-line interface for paging through statuses lists.
//!
//! # Commands
//!
//! - `bookmarks` - Page through the account's bookmarks
//! - `favorites` - Page through the account's favourites
//! - `validate` - Check the configuration file

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{fetch_list, render, ListReport, Runner};
