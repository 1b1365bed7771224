//! Page-Harvest main entry point
//!
//! This is the command-line interface for the Page-Harvest image crawler.

use anyhow::Context;
use clap::Parser;
use page_harvest::config::{load_config_with_hash, resolve_api_key, validate, Config};
use page_harvest::crawler::{run_crawl, user_agent};
use page_harvest::output::{load_statistics, print_statistics};
use page_harvest::state::{CancellationSignal, PageNumber};
use page_harvest::storage::locate_resume_page;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Page-Harvest: a continuous paginated image crawler
///
/// Page-Harvest walks a paginated image feed page by page, saving the images
/// of page N under page_N/. It resumes after the highest page already on disk
/// and stops after the current page on Ctrl-C.
#[derive(Parser, Debug)]
#[command(name = "page-harvest")]
#[command(version)]
#[command(about = "A continuous paginated image crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Directory holding the page directories (overrides the config)
    #[arg(long, value_name = "DIR")]
    storage_root: Option<PathBuf>,

    /// Start at this page instead of resuming from storage
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    start_page: Option<u64>,

    /// Stop after this many pages (overrides the config)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    max_pages: Option<u64>,

    /// Validate config and show where the crawl would start without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics of the storage root and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(root) = cli.storage_root {
        config.output.storage_root = root;
    }
    if cli.max_pages.is_some() {
        config.crawler.max_pages = cli.max_pages;
    }
    validate(&config).context("Invalid configuration")?;

    let start_page = cli.start_page.and_then(PageNumber::new);

    if cli.dry_run {
        handle_dry_run(&config, start_page)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(&config, start_page).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("error")
        } else {
            match verbose {
                0 => EnvFilter::new("page_harvest=info,warn"),
                1 => EnvFilter::new("page_harvest=debug,info"),
                2 => EnvFilter::new("page_harvest=trace,debug"),
                _ => EnvFilter::new("trace"),
            }
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows where the crawl starts
fn handle_dry_run(config: &Config, start_page: Option<PageNumber>) -> anyhow::Result<()> {
    println!("=== Page-Harvest Dry Run ===\n");

    println!("Feed:");
    println!("  Endpoint: {}", config.feed.endpoint);
    println!("  Items per page: {}", config.feed.limit);
    println!("  Auth header: {}", config.feed.auth_header);
    let credential = match resolve_api_key(&config.feed) {
        Ok(_) if config.feed.api_key.is_some() => "set inline".to_string(),
        Ok(_) => format!("read from ${}", config.feed.api_key_env),
        Err(e) => format!("MISSING ({})", e),
    };
    println!("  API key: {}", credential);

    println!("\nCrawler:");
    println!(
        "  Max concurrent items: {}",
        config.crawler.max_concurrent_items
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Connect timeout: {}s", config.crawler.connect_timeout_secs);
    match config.crawler.max_pages {
        Some(limit) => println!("  Page limit: {}", limit),
        None => println!("  Page limit: none (runs until interrupted)"),
    }
    println!("  User agent: {}", user_agent(&config.user_agent));

    let root = &config.output.storage_root;
    println!("\nOutput:");
    println!("  Storage root: {}", root.display());

    let start = match start_page {
        Some(page) => page,
        None => locate_resume_page(root).context("Failed to scan storage root")?,
    };

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling at page {}", start);

    Ok(())
}

/// Handles the --stats mode: shows statistics of the storage root
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let root = &config.output.storage_root;
    println!("Storage root: {}\n", root.display());

    let stats = load_statistics(root).context("Failed to scan storage root")?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, start_page: Option<PageNumber>) -> anyhow::Result<()> {
    let cancel = CancellationSignal::new();

    let signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                if signal.cancel() {
                    tracing::info!("Stopping the process after current page...");
                }
            }
            Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    tracing::info!(
        "Saving images under {}",
        config.output.storage_root.display()
    );

    match run_crawl(config, start_page, cancel).await {
        Ok(summary) => {
            tracing::info!(
                "Crawl finished: run began {} at page {}, next page {}, {} images saved",
                summary.started_at.to_rfc3339(),
                summary.start_page,
                summary.next_page,
                summary.items_saved
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
