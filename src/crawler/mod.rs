//! Crawler module for paginated feed fetching
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and error classification
//! - Page manifest decoding
//! - Per-item fetch and save
//! - Per-page fan-out with a fork-join barrier
//! - The continuous crawl loop

mod coordinator;
mod fetcher;
mod item;
mod manifest;
mod page;

pub use coordinator::{run_crawl, Crawler};
pub use fetcher::{build_http_client, fetch_bytes, user_agent, FetchResult};
pub use item::ItemFetcher;
pub use manifest::{decode_manifest, ItemRecord};
pub use page::PageFetcher;
