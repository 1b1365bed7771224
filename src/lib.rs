//! Page-Harvest: a continuous paginated image crawler
//!
//! This crate walks a paginated remote image feed page by page, saving every
//! image of page `N` under `page_N/<id>.jpg`. It resumes after the highest
//! page directory already on disk and stops cleanly between pages when
//! interrupted.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Page-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Page counter overflowed after page {0}")]
    PageOverflow(state::PageNumber),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing API key: set `feed.api-key` or the {env_var} environment variable")]
    MissingCredential { env_var: String },
}

/// Result type alias for Page-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Crawler};
pub use state::{CancellationSignal, ItemOutcome, PageNumber, PageOutcome, RunSummary};
pub use storage::{locate_resume_page, FsImageStore, ImageStore};
