//! Filesystem image store
//!
//! Writes `page_<N>/<id>.jpg` under a storage root. Page directories are
//! created on first write. Content is written to a hidden partial file in the
//! page directory and renamed into place, so a crash mid-write never leaves a
//! truncated image behind.

use crate::state::PageNumber;
use crate::storage::layout::{image_file_name, page_dir_name, validate_item_id, PARTIAL_SUFFIX};
use crate::storage::{ImageStore, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Image store backed by a local directory tree
#[derive(Debug)]
pub struct FsImageStore {
    root: PathBuf,
    partial_counter: AtomicU64,
}

impl FsImageStore {
    /// Creates a store rooted at `root`
    ///
    /// The root itself is created lazily together with the first page
    /// directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            partial_counter: AtomicU64::new(0),
        }
    }

    /// Directory holding the images of `page`
    pub fn page_dir(&self, page: PageNumber) -> PathBuf {
        self.root.join(page_dir_name(page))
    }

    /// Final location of item `id` on `page`
    pub fn image_path(&self, page: PageNumber, id: &str) -> PathBuf {
        self.page_dir(page).join(image_file_name(id))
    }

    fn partial_path(&self, page_dir: &Path, id: &str) -> PathBuf {
        // Unique per write so duplicate ids within a page never share a file
        let n = self.partial_counter.fetch_add(1, Ordering::Relaxed);
        page_dir.join(format!(".{}.{}.{}", image_file_name(id), n, PARTIAL_SUFFIX))
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn save_image(
        &self,
        page: PageNumber,
        id: &str,
        content: &[u8],
    ) -> StorageResult<PathBuf> {
        validate_item_id(id)?;

        let page_dir = self.page_dir(page);
        // create_dir_all succeeds when a sibling created the directory first
        fs::create_dir_all(&page_dir)
            .await
            .map_err(|source| StorageError::CreateDir {
                path: page_dir.clone(),
                source,
            })?;

        let target = self.image_path(page, id);
        let partial = self.partial_path(&page_dir, id);

        if let Err(source) = write_file(&partial, content).await {
            let _ = fs::remove_file(&partial).await;
            return Err(StorageError::Write {
                path: target,
                source,
            });
        }

        if let Err(source) = fs::rename(&partial, &target).await {
            let _ = fs::remove_file(&partial).await;
            return Err(StorageError::Write {
                path: target,
                source,
            });
        }

        tracing::trace!("Wrote {} bytes to {}", content.len(), target.display());
        Ok(target)
    }
}

/// Writes `content` to a fresh file; the handle is closed before returning
async fn write_file(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(content).await?;
    file.flush().await?;
    Ok(())
}
