//! Output module for reporting on harvested storage
//!
//! This module scans the storage root and prints a summary of what previous
//! runs have saved.

mod stats;

pub use stats::{load_statistics, print_statistics, StorageStatistics};
