//! CLI commands and argument parsing

use crate::endpoint::ListMode;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Page through bookmarks and favourites on a Mastodon-compatible server
#[derive(Parser, Debug)]
#[command(name = "feedpager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Server base URL (overrides the config file)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Access token (overrides the config file)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Page through bookmarked statuses
    Bookmarks(PageArgs),

    /// Page through favourited statuses
    Favorites(PageArgs),

    /// Validate the configuration file
    Validate,
}

impl Commands {
    /// List mode for paging commands
    pub fn list_mode(&self) -> Option<ListMode> {
        match self {
            Commands::Bookmarks(_) => Some(ListMode::Bookmarks),
            Commands::Favorites(_) => Some(ListMode::Favorites),
            Commands::Validate => None,
        }
    }
}

/// Arguments shared by paging commands
#[derive(Args, Debug, Clone)]
pub struct PageArgs {
    /// Maximum number of pages to load (at least 1)
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,

    /// Items per page (overrides the config file)
    #[arg(short, long)]
    pub limit: Option<u32>,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one status per line)
    Json,
    /// Human-readable output
    Pretty,
}
