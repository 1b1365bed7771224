/// Outcome definitions for page and item fetches
///
/// Fetchers never return errors to their caller; they report one of these
/// outcomes instead so that failures stay contained at their own level.
use std::fmt;
use std::path::PathBuf;

/// Result of processing one page of the feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    // ===== Success =====
    /// Manifest decoded and every item fetch settled
    Processed {
        /// Number of items listed in the manifest
        items: usize,
        /// Items written to storage
        saved: usize,
        /// Items that failed (bad URL, HTTP, network, storage or aborted)
        failed: usize,
        /// Bytes written across all saved items
        bytes: u64,
    },

    // ===== Page Failures =====
    /// The feed answered with a non-success status
    HttpError { status_code: u16 },

    /// The feed could not be reached or the body could not be read
    NetworkError { error: String },

    /// The manifest was not a JSON array of `{ id, url }` records
    DecodeError { error: String },
}

impl PageOutcome {
    /// Returns true if the page manifest was processed
    ///
    /// Individual item failures do not make a page unsuccessful.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed { .. })
    }

    /// Returns true if the page itself failed
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Short label used in log lines
    pub fn label(&self) -> &'static str {
        match self {
            Self::Processed { .. } => "processed",
            Self::HttpError { .. } => "http_error",
            Self::NetworkError { .. } => "network_error",
            Self::DecodeError { .. } => "decode_error",
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processed {
                items,
                saved,
                failed,
                bytes,
            } => write!(
                f,
                "{} items, {} saved, {} failed, {} bytes",
                items, saved, failed, bytes
            ),
            Self::HttpError { status_code } => write!(f, "HTTP {}", status_code),
            Self::NetworkError { error } => write!(f, "network error: {}", error),
            Self::DecodeError { error } => write!(f, "decode error: {}", error),
        }
    }
}

/// Result of fetching and saving one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Content written to storage
    Saved { bytes: u64, path: PathBuf },

    /// The manifest listed a URL that does not parse
    InvalidUrl { error: String },

    /// The image host answered with a non-success status
    HttpError { status_code: u16 },

    /// Connection, timeout or body read failure
    NetworkError { error: String },

    /// Directory creation or file write failed, or the id was unusable
    StorageError { error: String },

    /// The item task panicked or was cancelled by the runtime
    Aborted { error: String },
}

impl ItemOutcome {
    /// Bytes written, zero for failures
    pub fn bytes_written(&self) -> u64 {
        match self {
            Self::Saved { bytes, .. } => *bytes,
            _ => 0,
        }
    }
}

impl fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Saved { bytes, path } => write!(f, "saved {} bytes to {}", bytes, path.display()),
            Self::InvalidUrl { error } => write!(f, "invalid url: {}", error),
            Self::HttpError { status_code } => write!(f, "HTTP {}", status_code),
            Self::NetworkError { error } => write!(f, "network error: {}", error),
            Self::StorageError { error } => write!(f, "storage error: {}", error),
            Self::Aborted { error } => write!(f, "aborted: {}", error),
        }
    }
}
