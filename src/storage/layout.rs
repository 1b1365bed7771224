//! On-disk naming for page directories and image files
//!
//! Images for page `N` live in `page_N/<id>.jpg` under the storage root. The
//! resume locator parses the same pattern back, so both directions are kept
//! here.

use crate::state::PageNumber;
use crate::storage::{StorageError, StorageResult};

/// Prefix of every page directory name
pub const PAGE_DIR_PREFIX: &str = "page_";

/// Extension given to every saved image
pub const IMAGE_EXTENSION: &str = "jpg";

/// Suffix of in-progress writes; such files are never counted as images
pub const PARTIAL_SUFFIX: &str = "part";

/// Result of matching a directory name against the page pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageDirName {
    /// `page_<digits>` with a number that fits a page counter
    Page(PageNumber),

    /// Has the `page_` prefix but the rest is not a usable number
    Malformed(String),
}

/// Returns the directory name for a page, e.g. `page_7`
pub fn page_dir_name(page: PageNumber) -> String {
    format!("{}{}", PAGE_DIR_PREFIX, page)
}

/// Returns the file name for an item, e.g. `abc.jpg`
pub fn image_file_name(id: &str) -> String {
    format!("{}.{}", id, IMAGE_EXTENSION)
}

/// Parses a directory name produced by [`page_dir_name`]
///
/// Returns `None` for names without the `page_` prefix.
pub fn parse_page_dir_name(name: &str) -> Option<PageDirName> {
    let suffix = name.strip_prefix(PAGE_DIR_PREFIX)?;

    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Some(PageDirName::Malformed(format!(
            "'{}' is not a page number",
            suffix
        )));
    }

    Some(match suffix.parse::<u64>() {
        Ok(n) => match PageNumber::new(n) {
            Some(page) => PageDirName::Page(page),
            None => PageDirName::Malformed("pages are numbered from 1".to_string()),
        },
        Err(e) => PageDirName::Malformed(format!("'{}': {}", suffix, e)),
    })
}

/// Rejects item ids that cannot be used as a file name stem
///
/// Ids come from the remote feed, so anything that could escape the page
/// directory is refused.
pub fn validate_item_id(id: &str) -> StorageResult<()> {
    let reason = if id.is_empty() {
        Some("empty id")
    } else if id == "." || id == ".." {
        Some("relative path component")
    } else if id.contains(['/', '\\']) {
        Some("contains a path separator")
    } else if id.contains('\0') {
        Some("contains a NUL byte")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(StorageError::InvalidItemId {
            id: id.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
