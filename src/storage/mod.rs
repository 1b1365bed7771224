//! Storage module for persisting crawled images
//!
//! This module handles everything that touches the storage root:
//! - The `page_<N>/<id>.jpg` naming scheme
//! - The `ImageStore` trait used by item fetches, and its filesystem backend
//! - Locating the resume page from existing page directories

mod fs;
pub mod layout;
mod resume;
mod traits;

pub use fs::FsImageStore;
pub use resume::{locate_resume_page, scan_page_directories};
pub use traits::{ImageStore, StorageError, StorageResult};
