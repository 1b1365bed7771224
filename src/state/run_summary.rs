use crate::state::{PageNumber, PageOutcome};
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// Counters for a single crawl run
///
/// Owned by the crawl loop and updated only between page cycles.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Page the run started at
    pub start_page: PageNumber,

    /// Page the next cycle would have fetched
    pub next_page: PageNumber,

    /// Pages for which a fetch was attempted
    pub pages_attempted: u64,

    /// Pages whose manifest was processed
    pub pages_succeeded: u64,

    /// Pages skipped because the page fetch itself failed
    pub pages_failed: u64,

    /// Items written to storage
    pub items_saved: u64,

    /// Items that failed
    pub items_failed: u64,

    /// Bytes written to storage
    pub bytes_written: u64,

    /// Wall-clock start of the run
    pub started_at: DateTime<Utc>,

    started: Instant,
}

impl RunSummary {
    /// Creates an empty summary for a run starting at `start_page`
    pub fn new(start_page: PageNumber) -> Self {
        Self {
            start_page,
            next_page: start_page,
            pages_attempted: 0,
            pages_succeeded: 0,
            pages_failed: 0,
            items_saved: 0,
            items_failed: 0,
            bytes_written: 0,
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Folds the outcome of one page into the counters
    pub fn record_page(&mut self, outcome: &PageOutcome) {
        self.pages_attempted += 1;
        match outcome {
            PageOutcome::Processed {
                saved,
                failed,
                bytes,
                ..
            } => {
                self.pages_succeeded += 1;
                self.items_saved += *saved as u64;
                self.items_failed += *failed as u64;
                self.bytes_written += bytes;
            }
            _ => self.pages_failed += 1,
        }
    }

    /// Time since the run started
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
