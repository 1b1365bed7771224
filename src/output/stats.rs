//! Statistics over the storage root
//!
//! This module provides functionality for summarising what previous runs have
//! persisted: page directories, image counts and sizes, and gaps in the page
//! sequence left by skipped pages.

use crate::state::PageNumber;
use crate::storage::layout::{IMAGE_EXTENSION, PARTIAL_SUFFIX};
use crate::storage::{scan_page_directories, StorageError};
use std::path::Path;

/// Storage statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageStatistics {
    /// Number of page directories
    pub total_pages: u64,

    /// Number of saved images across all pages
    pub total_images: u64,

    /// Combined size of saved images
    pub total_bytes: u64,

    /// Lowest page directory present
    pub first_page: Option<PageNumber>,

    /// Highest page directory present
    pub last_page: Option<PageNumber>,

    /// Page numbers between first and last without a directory
    pub missing_pages: Vec<PageNumber>,

    /// Page directories holding no images
    pub empty_pages: Vec<PageNumber>,

    /// Leftover partial writes from interrupted runs
    pub partial_files: u64,
}

/// Loads statistics from a storage root
///
/// # Arguments
///
/// * `root` - The storage root holding `page_<N>` directories
///
/// # Returns
///
/// * `Ok(StorageStatistics)` - Successfully scanned statistics
/// * `Err(StorageError)` - The root or a page directory could not be read
pub fn load_statistics(root: &Path) -> Result<StorageStatistics, StorageError> {
    let pages = scan_page_directories(root)?;
    let mut stats = StorageStatistics {
        total_pages: pages.len() as u64,
        first_page: pages.first().map(|(page, _)| *page),
        last_page: pages.last().map(|(page, _)| *page),
        ..StorageStatistics::default()
    };

    let mut previous: Option<PageNumber> = None;
    for (page, dir) in &pages {
        if let Some(prev) = previous {
            // Gap listing is capped so a sparse tree cannot blow up the report
            let mut missing = prev.next();
            while let Some(gap) = missing {
                if gap >= *page || stats.missing_pages.len() >= 1000 {
                    break;
                }
                stats.missing_pages.push(gap);
                missing = gap.next();
            }
        }
        previous = Some(*page);

        let mut images = 0;
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }

            match path.extension().and_then(|ext| ext.to_str()) {
                Some(IMAGE_EXTENSION) => {
                    images += 1;
                    stats.total_bytes += metadata.len();
                }
                Some(PARTIAL_SUFFIX) => stats.partial_files += 1,
                _ => {}
            }
        }

        if images == 0 {
            stats.empty_pages.push(*page);
        }
        stats.total_images += images;
    }

    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &StorageStatistics) {
    println!("=== Storage Statistics ===\n");

    println!("Overview:");
    println!("  Page directories: {}", stats.total_pages);
    println!("  Images saved: {}", stats.total_images);
    println!("  Total size: {}", format_bytes(stats.total_bytes));

    match (stats.first_page, stats.last_page) {
        (Some(first), Some(last)) => {
            println!("  Page range: {} - {}", first, last);
            match last.next() {
                Some(next) => println!("  Next run resumes at page {}", next),
                None => println!("  Page counter exhausted"),
            }
        }
        _ => println!("  No pages yet, next run starts at page 1"),
    }
    println!();

    if stats.total_pages > 0 {
        let average = stats.total_images as f64 / stats.total_pages as f64;
        println!("Images per page: {:.1}", average);
    }

    if !stats.missing_pages.is_empty() {
        println!("\nMissing pages ({}):", stats.missing_pages.len());
        for page in stats.missing_pages.iter().take(20) {
            println!("  - page_{}", page);
        }
        if stats.missing_pages.len() > 20 {
            println!("  ... and {} more", stats.missing_pages.len() - 20);
        }
    }

    if !stats.empty_pages.is_empty() {
        println!("\nEmpty page directories ({}):", stats.empty_pages.len());
        for page in stats.empty_pages.iter().take(20) {
            println!("  - page_{}", page);
        }
    }

    if stats.partial_files > 0 {
        println!(
            "\nPartial files left by interrupted writes: {}",
            stats.partial_files
        );
    }
}

/// Formats a byte count using binary units
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
