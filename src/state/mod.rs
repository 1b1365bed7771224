//! State module for tracking crawl progress
//!
//! This module provides the in-memory state of a crawl run.
//!
//! # Components
//!
//! - `PageNumber`: Position in the paginated feed
//! - `CancellationSignal`: Stop flag set by an external interrupt
//! - `PageOutcome` / `ItemOutcome`: Results of a page or item fetch
//! - `RunSummary`: Counters reported when the crawl loop exits

mod cancel;
mod outcome;
mod page_number;
mod run_summary;

// Re-export main types
pub use cancel::CancellationSignal;
pub use outcome::{ItemOutcome, PageOutcome};
pub use page_number::PageNumber;
pub use run_summary::RunSummary;
