use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Page-Harvest
///
/// Every section has defaults, so an empty file (or no file at all) yields a
/// usable configuration apart from the API key.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Remote feed configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FeedConfig {
    /// Page endpoint; `limit` and `page` are appended as query parameters
    pub endpoint: String,

    /// Number of items requested per page
    pub limit: u32,

    /// Header carrying the API key
    pub auth_header: String,

    /// Inline API key, takes precedence over `api_key_env`
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.thecatapi.com/v1/images/search".to_string(),
            limit: 100,
            auth_header: "x-api-key".to_string(),
            api_key: None,
            api_key_env: "CAT_API_KEY".to_string(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of item fetches in flight within one page
    pub max_concurrent_items: u32,

    /// Total timeout for a single request (seconds)
    pub request_timeout_secs: u64,

    /// Connection timeout for a single request (seconds)
    pub connect_timeout_secs: u64,

    /// Stop after this many page cycles; unbounded when absent
    pub max_pages: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_items: 16,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            max_pages: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory holding the `page_<N>` directories
    pub storage_root: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("."),
        }
    }
}
