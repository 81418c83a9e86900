//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat, PageArgs};
use crate::config::{FeedConfig, HttpConfig, ListConfig, ServerConfig};
use crate::controllers::{StatusDataController, StatusDataControllers};
use crate::endpoint::ListMode;
use crate::error::{Error, Result, ResultExt};
use crate::fetcher::PagedFetcher;
use crate::http::{HttpClient, RateLimiterConfig};
use crate::model::Status;
use std::io::Write;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of paging through one list
#[derive(Debug)]
pub struct ListReport {
    pub mode: ListMode,
    pub statuses: Vec<Status>,
    pub pages_loaded: u32,
    pub has_more: bool,
    pub controllers: StatusDataControllers,
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Validate => self.validate(),
            Commands::Bookmarks(args) => self.list(ListMode::Bookmarks, args).await,
            Commands::Favorites(args) => self.list(ListMode::Favorites, args).await,
        }
    }

    /// Resolve configuration from the file and command-line overrides
    pub fn load_config(&self) -> Result<FeedConfig> {
        let mut config = match (&self.cli.config, &self.cli.base_url) {
            (Some(path), _) => FeedConfig::load(path)?,
            (None, Some(base_url)) => FeedConfig {
                server: ServerConfig {
                    base_url: base_url.clone(),
                    access_token: None,
                },
                http: HttpConfig::default(),
                rate_limit: Some(RateLimiterConfig::default()),
                list: ListConfig::default(),
            },
            (None, None) => {
                return Err(Error::config(
                    "No server configured (use -C <file> or --base-url)",
                ))
            }
        };

        if let Some(base_url) = &self.cli.base_url {
            config.server.base_url.clone_from(base_url);
        }
        if let Some(token) = &self.cli.token {
            config.server.access_token = Some(token.clone());
        }
        if let Some(limit) = self.page_args().and_then(|a| a.limit) {
            config.list.limit = Some(limit);
        }

        config.validate()?;
        Ok(config)
    }

    fn page_args(&self) -> Option<&PageArgs> {
        match &self.cli.command {
            Commands::Bookmarks(args) | Commands::Favorites(args) => Some(args),
            Commands::Validate => None,
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        println!(
            "Configuration OK: {} ({}, {})",
            config.server.base_url,
            config.list.mode,
            if config.auth().is_none() {
                "anonymous"
            } else {
                "authenticated"
            }
        );
        Ok(())
    }

    /// Page through a list and print it
    async fn list(&self, mode: ListMode, args: &PageArgs) -> Result<()> {
        let config = self.load_config()?;
        let report = fetch_list(&config, mode, args.pages).await?;

        let mut buffer = Vec::new();
        render(&report, self.cli.format, &mut buffer).await?;
        std::io::stdout().lock().write_all(&buffer)?;

        eprintln!(
            "{}: {} statuses in {} page(s){}",
            report.mode,
            report.statuses.len(),
            report.pages_loaded,
            if report.has_more {
                ", more available"
            } else {
                ""
            }
        );
        Ok(())
    }
}

/// Load up to `max_pages` pages of `mode`
///
/// Fails if the first page fails or `max_pages` is zero. A failed later
/// page stops paging and keeps what was loaded.
pub async fn fetch_list(config: &FeedConfig, mode: ListMode, max_pages: u32) -> Result<ListReport> {
    if max_pages == 0 {
        return Err(Error::config("At least one page must be requested"));
    }

    let client = HttpClient::with_config(config.http_client_config())?;
    let controllers = StatusDataControllers::new();
    let mut fetcher = PagedFetcher::<Status, _>::new(client, config.paged_list(Some(mode)))
        .with_registry(Arc::new(controllers.clone()));

    fetcher.load_first_page(false).await;
    if let Some(e) = fetcher.state().error() {
        return Err(Error::Other(format!("Failed to load {mode}: {e}")));
    }

    let mut pages_loaded = 1;
    while pages_loaded < max_pages && fetcher.load_next_page().await {
        if let Some(e) = fetcher.state().transient_error() {
            warn!("Stopping after {} page(s): {}", pages_loaded, e);
            break;
        }
        pages_loaded += 1;
        info!("Loaded page {} of {}", pages_loaded, mode);
    }

    let state = fetcher.state();
    Ok(ListReport {
        mode,
        statuses: state.items().to_vec(),
        pages_loaded,
        has_more: state.has_more(),
        controllers,
    })
}

/// Write a report in the requested format
pub async fn render<W: Write>(report: &ListReport, format: OutputFormat, out: &mut W) -> Result<()> {
    for status in &report.statuses {
        match format {
            OutputFormat::Json => {
                let line = serde_json::to_string(status)
                    .with_context(|| format!("encoding status {}", status.id))?;
                writeln!(out, "{line}")?;
            }
            OutputFormat::Pretty => {
                let controller = match report.controllers.get(&status.id).await {
                    Some(c) => c,
                    None => StatusDataController::from_status(status),
                };
                write_pretty(out, status, &controller)?;
            }
        }
    }
    Ok(())
}

fn write_pretty<W: Write>(
    out: &mut W,
    status: &Status,
    controller: &StatusDataController,
) -> Result<()> {
    let shown = status.displayed();
    writeln!(
        out,
        "{} {} (@{})",
        shown.created_at.format("%Y-%m-%d %H:%M"),
        shown.account.name(),
        shown.account.acct
    )?;
    if !shown.spoiler_text.is_empty() {
        writeln!(out, "  CW: {}", shown.spoiler_text)?;
    }
    for line in status.plain_text().lines() {
        writeln!(out, "  {line}")?;
    }
    writeln!(
        out,
        "  replies {}  boosts {}  favourites {}{}",
        controller.replies_count,
        controller.reblogs_count,
        controller.favourites_count,
        if controller.is_bookmarked {
            "  [bookmarked]"
        } else {
            ""
        }
    )?;
    writeln!(out)?;
    Ok(())
}
