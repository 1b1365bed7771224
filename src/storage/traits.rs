//! Storage traits and error types
//!
//! This module defines the trait interface for image storage backends and
//! associated error types.

use crate::state::PageNumber;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid item id '{id}': {reason}")]
    InvalidItemId { id: String, reason: &'static str },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read storage root {path}: {source}")]
    ReadRoot {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No page follows page {0}")]
    ResumeOverflow(PageNumber),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for image storage backends
///
/// Implementations must tolerate concurrent calls for the same page: sibling
/// item fetches of one page all write into the same page directory at once.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persists the content of item `id` for `page`
    ///
    /// Writing the same `(page, id)` twice replaces the earlier content.
    ///
    /// # Returns
    ///
    /// The location the content was written to
    async fn save_image(
        &self,
        page: PageNumber,
        id: &str,
        content: &[u8],
    ) -> StorageResult<PathBuf>;
}
