//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop:
//! - Resolving the start page (explicit, or resumed from storage)
//! - Fetching pages strictly one after another
//! - Advancing the page counter after every cycle, whatever its outcome
//! - Honouring cancellation between pages

use crate::config::{resolve_api_key, Config};
use crate::crawler::item::ItemFetcher;
use crate::crawler::page::PageFetcher;
use crate::crawler::build_http_client;
use crate::state::{CancellationSignal, PageNumber, RunSummary};
use crate::storage::{locate_resume_page, FsImageStore, ImageStore};
use crate::HarvestError;
use std::sync::Arc;

/// Main crawler structure
pub struct Crawler {
    page_fetcher: PageFetcher,
    cancel: CancellationSignal,
    max_pages: Option<u64>,
}

impl Crawler {
    /// Creates a crawler for the configured feed
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration
    /// * `api_key` - Resolved feed credential
    /// * `store` - Where item content is persisted
    /// * `cancel` - Checked before every page cycle
    pub fn new(
        config: &Config,
        api_key: &str,
        store: Arc<dyn ImageStore>,
        cancel: CancellationSignal,
    ) -> Result<Self, HarvestError> {
        let client = build_http_client(config)?;
        let item_fetcher = ItemFetcher::new(client.clone(), store);
        let page_fetcher = PageFetcher::new(
            client,
            &config.feed,
            api_key,
            item_fetcher,
            config.crawler.max_concurrent_items as usize,
        )?;

        Ok(Self::from_parts(page_fetcher, cancel).with_max_pages(config.crawler.max_pages))
    }

    /// Creates a crawler around an existing page fetcher
    pub fn from_parts(page_fetcher: PageFetcher, cancel: CancellationSignal) -> Self {
        Self {
            page_fetcher,
            cancel,
            max_pages: None,
        }
    }

    /// Stops the loop after `max_pages` cycles in addition to cancellation
    pub fn with_max_pages(mut self, max_pages: Option<u64>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Runs the crawl loop starting at `start_page`
    ///
    /// Each cycle checks the cancellation signal, processes one page to
    /// completion and then moves to the next page. The counter advances even
    /// when the page failed, so a failed page is not retried in this run.
    ///
    /// Returns once cancellation is observed or the page limit is reached. The
    /// only error is the page counter running out of numbers.
    pub async fn run(&self, start_page: PageNumber) -> Result<RunSummary, HarvestError> {
        let mut summary = RunSummary::new(start_page);
        let mut current_page = start_page;

        tracing::info!("Starting to download from page {}", start_page);

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!("Cancellation observed, stopping before page {}", current_page);
                break;
            }

            if let Some(limit) = self.max_pages {
                if summary.pages_attempted >= limit {
                    tracing::info!("Reached page limit of {}", limit);
                    break;
                }
            }

            let outcome = self.page_fetcher.fetch(current_page).await;
            if outcome.is_failure() {
                tracing::warn!(
                    "Page {} failed ({}), moving on to the next page",
                    current_page,
                    outcome.label()
                );
            }
            summary.record_page(&outcome);

            current_page = current_page
                .next()
                .ok_or(HarvestError::PageOverflow(current_page))?;
            summary.next_page = current_page;

            if summary.pages_attempted % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages ({} failed), {} images saved, {:.2} pages/sec",
                    summary.pages_attempted,
                    summary.pages_failed,
                    summary.items_saved,
                    summary.pages_attempted as f64 / summary.elapsed().as_secs_f64()
                );
            }
        }

        tracing::info!(
            "Crawl stopped after {} pages in {:?}: {} images saved, {} failed, {} pages skipped; next page is {}",
            summary.pages_attempted,
            summary.elapsed(),
            summary.items_saved,
            summary.items_failed,
            summary.pages_failed,
            summary.next_page
        );

        Ok(summary)
    }
}

/// Runs the main crawl operation
///
/// 1. Resolve the API key (missing key is fatal, nothing is fetched)
/// 2. Pick the start page: `start_page` if given, otherwise one past the
///    highest page directory under the storage root
/// 3. Run the crawl loop until `cancel` is set or the page limit is hit
///
/// # Example
///
/// ```no_run
/// use page_harvest::config::load_config;
/// use page_harvest::crawler::run_crawl;
/// use page_harvest::state::CancellationSignal;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let summary = run_crawl(&config, None, CancellationSignal::new()).await?;
/// println!("Saved {} images", summary.items_saved);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    start_page: Option<PageNumber>,
    cancel: CancellationSignal,
) -> Result<RunSummary, HarvestError> {
    let api_key = resolve_api_key(&config.feed)?;
    let root = &config.output.storage_root;

    let start_page = match start_page {
        Some(page) => {
            tracing::info!("Starting at page {} as requested", page);
            page
        }
        None => locate_resume_page(root)?,
    };

    let store = Arc::new(FsImageStore::new(root));
    let crawler = Crawler::new(config, &api_key, store, cancel)?;
    crawler.run(start_page).await
}
