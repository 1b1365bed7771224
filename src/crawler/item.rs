//! Single item fetch
//!
//! Downloads one image and hands it to the image store. Every failure is
//! logged with the item id and reported as an [`ItemOutcome`]; nothing is
//! returned as an error, so one bad item never affects its siblings.

use crate::crawler::fetcher::{fetch_bytes, FetchResult};
use crate::state::{ItemOutcome, PageNumber};
use crate::storage::ImageStore;
use reqwest::Client;
use std::sync::Arc;
use url::Url;

/// Fetches items and persists them through an [`ImageStore`]
///
/// Cheap to clone; clones share the HTTP client and the store.
#[derive(Clone)]
pub struct ItemFetcher {
    client: Client,
    store: Arc<dyn ImageStore>,
}

impl ItemFetcher {
    pub fn new(client: Client, store: Arc<dyn ImageStore>) -> Self {
        Self { client, store }
    }

    /// Fetches `url` and saves the content as item `id` of `page`
    pub async fn fetch_and_save(&self, page: PageNumber, id: &str, url: &str) -> ItemOutcome {
        let url = match Url::parse(url) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("Invalid URL for image {} on page {}: {}", id, page, e);
                return ItemOutcome::InvalidUrl {
                    error: format!("'{}': {}", url, e),
                };
            }
        };
        tracing::debug!("Fetching image {} for page {} from {}", id, page, url);

        let body = match fetch_bytes(self.client.get(url)).await {
            FetchResult::Success { body } => body,
            FetchResult::HttpError { status_code } => {
                tracing::error!("Failed to fetch image {}: HTTP {}", id, status_code);
                return ItemOutcome::HttpError { status_code };
            }
            FetchResult::NetworkError { error } => {
                tracing::error!("HTTP error while fetching image {}: {}", id, error);
                return ItemOutcome::NetworkError { error };
            }
        };

        match self.store.save_image(page, id, &body).await {
            Ok(path) => {
                tracing::info!(
                    "Downloaded and saved image {} ({} bytes) to {}",
                    id,
                    body.len(),
                    path.display()
                );
                ItemOutcome::Saved {
                    bytes: body.len() as u64,
                    path,
                }
            }
            Err(e) => {
                tracing::error!("Failed to save image {} for page {}: {}", id, page, e);
                ItemOutcome::StorageError {
                    error: e.to_string(),
                }
            }
        }
    }
}
