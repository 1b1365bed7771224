//! Resume position from persisted page directories
//!
//! A run resumes at the page after the highest `page_<N>` directory found
//! directly under the storage root.

use crate::state::PageNumber;
use crate::storage::layout::{parse_page_dir_name, PageDirName};
use crate::storage::{StorageError, StorageResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Lists the page directories directly under `root`, sorted by page number
///
/// Plain files are ignored and symlinks are followed. Names with the page
/// prefix but an unusable number, and entries whose metadata cannot be read,
/// are logged and skipped. A missing root yields an empty list.
pub fn scan_page_directories(root: &Path) -> StorageResult<Vec<(PageNumber, PathBuf)>> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("Storage root {} does not exist yet", root.display());
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(StorageError::ReadRoot {
                path: root.to_path_buf(),
                source,
            })
        }
    };

    let mut pages = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StorageError::ReadRoot {
            path: root.to_path_buf(),
            source,
        })?;

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };

        match parse_page_dir_name(name) {
            Some(PageDirName::Page(page)) => {
                let path = entry.path();
                // Follows symlinks so a linked page directory still counts
                match std::fs::metadata(&path) {
                    Ok(metadata) if metadata.is_dir() => pages.push((page, path)),
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
                }
            }
            Some(PageDirName::Malformed(reason)) => {
                tracing::warn!("Skipping {}: {}", name, reason);
            }
            None => {}
        }
    }

    pages.sort_by_key(|(page, _)| *page);
    Ok(pages)
}

/// Computes the page a new run should start at
///
/// Returns one past the highest page directory, or page 1 when there are
/// none.
///
/// # Example
///
/// ```no_run
/// use page_harvest::storage::locate_resume_page;
/// use std::path::Path;
///
/// let start = locate_resume_page(Path::new("./images")).unwrap();
/// println!("Resuming at page {}", start);
/// ```
pub fn locate_resume_page(root: &Path) -> StorageResult<PageNumber> {
    let pages = scan_page_directories(root)?;

    match pages.last() {
        Some((highest, _)) => {
            let next = highest
                .next()
                .ok_or(StorageError::ResumeOverflow(*highest))?;
            tracing::debug!("Highest page directory is {}, resuming at {}", highest, next);
            Ok(next)
        }
        None => Ok(PageNumber::FIRST),
    }
}
