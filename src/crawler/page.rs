//! Page fetch and per-page fan-out
//!
//! Fetches one page manifest, starts one item fetch per record and waits for
//! every one of them before returning. That wait is what keeps pages strictly
//! sequential: all items of page N settle before page N+1 is requested.

use crate::config::FeedConfig;
use crate::crawler::fetcher::{fetch_bytes, FetchResult};
use crate::crawler::item::ItemFetcher;
use crate::crawler::manifest::{decode_manifest, ItemRecord};
use crate::state::{ItemOutcome, PageNumber, PageOutcome};
use crate::ConfigError;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Fetches pages of the feed and fans out their items
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
    endpoint: Url,
    limit: u32,
    auth_header: HeaderName,
    api_key: HeaderValue,
    item_fetcher: ItemFetcher,
    max_concurrent_items: usize,
}

impl PageFetcher {
    /// Creates a page fetcher for the configured feed
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client
    /// * `feed` - Endpoint, page size and auth header name
    /// * `api_key` - Resolved credential sent with every page request
    /// * `item_fetcher` - Used for every item of every page
    /// * `max_concurrent_items` - Item fetches allowed in flight per page
    pub fn new(
        client: Client,
        feed: &FeedConfig,
        api_key: &str,
        item_fetcher: ItemFetcher,
        max_concurrent_items: usize,
    ) -> Result<Self, ConfigError> {
        let endpoint = Url::parse(&feed.endpoint)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid endpoint: {}", e)))?;

        let auth_header = HeaderName::from_bytes(feed.auth_header.as_bytes()).map_err(|_| {
            ConfigError::Validation(format!("Invalid auth header '{}'", feed.auth_header))
        })?;

        let mut api_key = HeaderValue::from_str(api_key).map_err(|_| {
            ConfigError::Validation("API key contains invalid header characters".to_string())
        })?;
        api_key.set_sensitive(true);

        Ok(Self {
            client,
            endpoint,
            limit: feed.limit,
            auth_header,
            api_key,
            item_fetcher,
            max_concurrent_items: max_concurrent_items.max(1),
        })
    }

    /// Builds `<endpoint>?limit=<N>&page=<P>`, keeping any query already on
    /// the endpoint
    pub fn page_url(&self, page: PageNumber) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("limit", &self.limit.to_string())
            .append_pair("page", &page.to_string());
        url
    }

    /// Processes one page
    ///
    /// Never fails: page-level problems are logged and returned as a failed
    /// [`PageOutcome`], item-level problems are counted in
    /// [`PageOutcome::Processed`].
    pub async fn fetch(&self, page: PageNumber) -> PageOutcome {
        let url = self.page_url(page);
        tracing::info!("Fetching page {}", page);
        tracing::debug!("Page {} request: {}", page, url);

        let request = self
            .client
            .get(url)
            .header(self.auth_header.clone(), self.api_key.clone());

        let body = match fetch_bytes(request).await {
            FetchResult::Success { body } => body,
            FetchResult::HttpError { status_code } => {
                tracing::error!("Failed to fetch page {}: HTTP {}", page, status_code);
                return PageOutcome::HttpError { status_code };
            }
            FetchResult::NetworkError { error } => {
                tracing::error!("HTTP error for page {}: {}", page, error);
                return PageOutcome::NetworkError { error };
            }
        };

        let records = match decode_manifest(&body) {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("Failed to decode manifest for page {}: {}", page, e);
                return PageOutcome::DecodeError {
                    error: e.to_string(),
                };
            }
        };

        let outcome = self.fetch_items(page, records).await;
        tracing::info!("Finished page {}: {}", page, outcome);
        outcome
    }

    /// Runs one item fetch per record and waits for all of them
    async fn fetch_items(&self, page: PageNumber, records: Vec<ItemRecord>) -> PageOutcome {
        let items = records.len();
        if items == 0 {
            tracing::info!("Page {} lists no items", page);
        }

        let permits = Arc::new(Semaphore::new(self.max_concurrent_items));
        let mut tasks = JoinSet::new();

        for record in records {
            let fetcher = self.item_fetcher.clone();
            let permits = permits.clone();
            tasks.spawn(async move {
                let outcome = match permits.acquire_owned().await {
                    Ok(_permit) => fetcher.fetch_and_save(page, &record.id, &record.url).await,
                    Err(e) => ItemOutcome::Aborted {
                        error: e.to_string(),
                    },
                };
                (record.id, outcome)
            });
        }

        let mut saved = 0;
        let mut failed = 0;
        let mut bytes = 0;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, outcome @ ItemOutcome::Saved { .. })) => {
                    saved += 1;
                    bytes += outcome.bytes_written();
                }
                Ok((id, outcome)) => {
                    tracing::debug!("Item {} on page {} not saved: {}", id, page, outcome);
                    failed += 1;
                }
                Err(e) => {
                    tracing::error!("Item task on page {} aborted: {}", page, e);
                    failed += 1;
                }
            }
        }

        PageOutcome::Processed {
            items,
            saved,
            failed,
            bytes,
        }
    }
}
